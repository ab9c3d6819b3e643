use serde_json::Value;

pub const INSET_BANNER: &str = "INSET_BANNER";

/// Optional field access over a decoded JSON value. Absent keys, nulls and
/// type mismatches all read as `None`.
pub trait FieldExt {
    fn field(&self, key: &str) -> Option<&Value>;
    fn path(&self, keys: &[&str]) -> Option<&Value>;
    fn str_field(&self, key: &str) -> Option<&str>;
}

impl FieldExt for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key).filter(|v| !v.is_null())
    }

    fn path(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().try_fold(self, |value, key| value.field(key))
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key)?.as_str()
    }
}

pub fn inset_banner_link(response: &Value) -> Option<&str> {
    let widgets = response.field("list_top_widgets")?.as_array()?;
    let banner = widgets
        .iter()
        .find(|widget| widget.str_field("widget_type") == Some(INSET_BANNER))?;
    banner
        .path(&["data", "action", "payload", "link"])?
        .as_str()
}
