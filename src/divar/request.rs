use serde::Serialize;
use uuid::Uuid;

use crate::domain::QuerySpec;

pub const SEARCH_ENDPOINT: &str = "https://api.divar.ir/v8/postlist/w/search";

const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("content-type", "application/json"),
    ("origin", "https://divar.ir"),
    ("priority", "u=1, i"),
    ("referer", "https://divar.ir/"),
    (
        "sec-ch-ua",
        r#""Not/A)Brand";v="8", "Chromium";v="126", "Google Chrome";v="126""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""Linux""#),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    (
        "user-agent",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    ),
    ("x-render-type", "CSR"),
    ("x-standard-divar-error", "true"),
];

pub fn default_headers() -> Vec<(String, String)> {
    BROWSER_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn session_cookie() -> String {
    format!("did={};", Uuid::new_v4())
}

pub fn build_request(query: &QuerySpec) -> SearchRequest<'_> {
    SearchRequest {
        city_ids: &query.city_ids,
        search_data: SearchData {
            form_data: FormData {
                data: FormFields {
                    category: CategoryField {
                        str: StrValue {
                            value: &query.category,
                        },
                    },
                },
            },
        },
    }
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub city_ids: &'a [String],
    pub search_data: SearchData<'a>,
}

#[derive(Debug, Serialize)]
pub struct SearchData<'a> {
    pub form_data: FormData<'a>,
}

#[derive(Debug, Serialize)]
pub struct FormData<'a> {
    pub data: FormFields<'a>,
}

#[derive(Debug, Serialize)]
pub struct FormFields<'a> {
    pub category: CategoryField<'a>,
}

#[derive(Debug, Serialize)]
pub struct CategoryField<'a> {
    pub str: StrValue<'a>,
}

#[derive(Debug, Serialize)]
pub struct StrValue<'a> {
    pub value: &'a str,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_body_matches_search_form() {
        let query = QuerySpec {
            index: 0,
            city_ids: vec!["1".into(), "6".into()],
            neighborhood_ids: vec!["92".into()],
            category: "game-consoles-and-video-games".into(),
            expected_row_count: 70,
        };
        let body = serde_json::to_value(build_request(&query)).unwrap();
        assert_eq!(
            body,
            json!({
                "city_ids": ["1", "6"],
                "search_data": {
                    "form_data": {
                        "data": {
                            "category": { "str": { "value": "game-consoles-and-video-games" } }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn session_cookie_changes_per_call() {
        let a = session_cookie();
        let b = session_cookie();
        assert!(a.starts_with("did=") && a.ends_with(';'));
        assert_ne!(a, b);
    }
}
