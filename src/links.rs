use serde::{Deserialize, Serialize};

/// A saved link as returned by the service. Unknown fields in responses are
/// ignored; metadata fields the summarizer has not filled in yet are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub id: String,

    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinksResponse {
    #[serde(default)]
    pub links: Vec<Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_with_extra_fields_still_decodes() {
        let raw = r#"{
            "links": [
                {
                    "id": "abc",
                    "url": "https://a.io",
                    "title": "A",
                    "summary": "about a",
                    "favicon": "https://a.io/fav.ico",
                    "userId": "u1",
                    "createdAt": "2026-01-01T00:00:00"
                }
            ]
        }"#;

        let response: LinksResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.links.len(), 1);
        assert_eq!(response.links[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn missing_metadata_fields_default_to_none() {
        let raw = r#"{ "id": "1", "url": "https://a.io" }"#;
        let reference: Reference = serde_json::from_str(raw).unwrap();
        assert!(reference.title.is_none());
        assert!(reference.summary.is_none());
        assert!(reference.favicon.is_none());
    }
}
