use inkwell_common::model::post::Post;
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub(crate) enum RecordError {
    #[error("Post record has no id")]
    MissingId,
    #[error("Post record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
pub(crate) struct PostRecord {
    pub id: Option<u64>,
    pub author: String,
    pub title: String,
    pub content: String,
    #[serde(default, deserialize_with = "lenient_likes")]
    pub likes: u64,
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl PostRecord {
    pub fn parse(value: Value) -> Result<Post, RecordError> {
        let record: PostRecord = serde_json::from_value(value)?;
        if !record.unknown.is_empty() {
            let fields: Vec<&str> = record.unknown.keys().map(String::as_str).collect();
            debug!(id = ?record.id, ?fields, "Dropping unknown post record fields");
        }

        Post::try_from(record)
    }
}

// Null means no likes yet; negative counts are clamped to zero.
fn lenient_likes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(number)) => match (number.as_u64(), number.as_i64()) {
            (Some(likes), _) => Ok(likes),
            (None, Some(_)) => Ok(0),
            (None, None) => Err(D::Error::custom("likes must be an integer")),
        },
        Some(_) => Err(D::Error::custom("likes must be an integer")),
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = RecordError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.ok_or(RecordError::MissingId)?.into(),
            author: value.author,
            title: value.title,
            content: value.content,
            likes: value.likes,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::{PostRecord, RecordError};
    use serde_json::json;

    #[test]
    fn parses_complete_record() {
        let post = PostRecord::parse(json!({
            "id": 4,
            "author": "A",
            "title": "T",
            "content": "C",
            "likes": 2,
        }))
        .unwrap();

        assert_eq!(post.id, 4.into());
        assert_eq!(post.likes, 2);
    }

    #[test]
    fn missing_id_is_reported() {
        let result = PostRecord::parse(json!({"author": "A", "title": "T", "content": "C"}));

        assert!(matches!(result, Err(RecordError::MissingId)));
    }

    #[test]
    fn wrong_types_are_malformed() {
        let result = PostRecord::parse(json!({"id": "one", "author": "A", "title": "T", "content": "C"}));
        assert!(matches!(result, Err(RecordError::Malformed(_))));

        let result = PostRecord::parse(json!(17));
        assert!(matches!(result, Err(RecordError::Malformed(_))));
    }

    #[test]
    fn null_and_negative_likes_count_as_zero() {
        let post = PostRecord::parse(json!({
            "id": 1, "author": "A", "title": "T", "content": "C", "likes": null,
        }))
        .unwrap();
        assert_eq!(post.likes, 0);

        let post = PostRecord::parse(json!({
            "id": 2, "author": "A", "title": "T", "content": "C", "likes": -1,
        }))
        .unwrap();
        assert_eq!(post.likes, 0);

        let result = PostRecord::parse(json!({
            "id": 3, "author": "A", "title": "T", "content": "C", "likes": 1.5,
        }));
        assert!(matches!(result, Err(RecordError::Malformed(_))));
    }

    #[test]
    fn unknown_fields_do_not_reject_record() {
        let post = PostRecord::parse(json!({
            "id": 3, "author": "A", "title": "T", "content": "C", "tags": ["x"],
        }))
        .unwrap();

        assert_eq!(post.id, 3.into());
    }
}
