use std::collections::HashMap;

#[derive(Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    /// The `slug` parameter, trimmed. Empty when missing.
    pub fn get_slug(&self) -> &str {
        self.items.get("slug").map(|s| s.trim()).unwrap_or("")
    }
}
