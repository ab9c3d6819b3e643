use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Publisher {
    Yektanet,
    Tapsell,
    Daart,
    WithUtm,
    WithoutUtm,
}

impl Publisher {
    pub const ALL: [Publisher; 5] = [
        Publisher::Yektanet,
        Publisher::Tapsell,
        Publisher::Daart,
        Publisher::WithUtm,
        Publisher::WithoutUtm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Publisher::Yektanet => "YEKTANET",
            Publisher::Tapsell => "tapsell",
            Publisher::Daart => "DAART",
            Publisher::WithUtm => "WITH UTM",
            Publisher::WithoutUtm => "WITHOUT UTM",
        }
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    utm_case_sensitive: bool,
}

impl Classifier {
    pub fn new(utm_case_sensitive: bool) -> Self {
        Self { utm_case_sensitive }
    }

    /// First matching rule wins. Publisher keywords are always matched on
    /// the lower-cased URL.
    pub fn classify(&self, url: &str) -> Publisher {
        let lowered = url.to_lowercase();
        if lowered.contains("adivery") || lowered.contains("yektanet") {
            Publisher::Yektanet
        } else if lowered.contains("tapsell") {
            Publisher::Tapsell
        } else if lowered.contains("daart") {
            Publisher::Daart
        } else {
            let haystack = if self.utm_case_sensitive { url } else { lowered.as_str() };
            if haystack.contains("utm") {
                Publisher::WithUtm
            } else {
                Publisher::WithoutUtm
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_keywords_take_priority_over_utm() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("https://shop.example/?utm_source=tapsell"),
            Publisher::Tapsell
        );
        assert_eq!(
            classifier.classify("https://landing.example/?utm_yn_adivery=v1&utm_source=tapsell"),
            Publisher::Yektanet
        );
        assert_eq!(
            classifier.classify("https://DAART.example/promo"),
            Publisher::Daart
        );
    }

    #[test]
    fn utm_presence_splits_the_rest() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("https://shop.example/sale"),
            Publisher::WithoutUtm
        );
        assert_eq!(
            classifier.classify("https://shop.example/?utm_campaign=spring"),
            Publisher::WithUtm
        );
    }

    #[test]
    fn utm_case_sensitivity_is_configurable() {
        let url = "https://shop.example/?UTM_SOURCE=x";
        assert_eq!(Classifier::new(false).classify(url), Publisher::WithUtm);
        assert_eq!(Classifier::new(true).classify(url), Publisher::WithoutUtm);
    }
}
