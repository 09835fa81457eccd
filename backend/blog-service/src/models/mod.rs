/// Data models for blog-service
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored blog post.
///
/// `id` and both timestamps are assigned by the database; the JSON form
/// (also the cached form) uses camelCase field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

impl NewPost {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_post_serializes_camel_case() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let post = Post {
            id: 1,
            title: "Test Post".into(),
            body: "Test Body".into(),
            created_at: ts,
            updated_at: ts,
        };

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["createdAt"], "2024-05-01T12:00:00Z");
        assert_eq!(value["updatedAt"], "2024-05-01T12:00:00Z");
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_new_post_deserializes_request_body() {
        let input: NewPost =
            serde_json::from_str(r#"{"title":"An interesting blog post","body":"Content"}"#)
                .unwrap();
        assert_eq!(input, NewPost::new("An interesting blog post", "Content"));
    }
}
