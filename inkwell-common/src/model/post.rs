use crate::model::{Id, ModelValidationError};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

pub type PostId = Id<PostMarker>;

/// Field order here is the order fields are written to the backing file.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
pub struct Post {
    pub id: PostId,
    pub author: String,
    pub title: String,
    pub content: String,
    pub likes: u64,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreatePost {
    author: String,
    title: String,
    content: String,
}

/// Has no `id` field and rejects unknown fields when deserializing, so an
/// update can never change which post it applies to.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostChanges {
    pub author: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Post {
    #[must_use]
    pub fn new(id: PostId, post: CreatePost) -> Self {
        Self {
            id,
            author: post.author,
            title: post.title,
            content: post.content,
            likes: 0,
        }
    }

    pub fn apply(&mut self, changes: PostChanges) {
        let PostChanges {
            author,
            title,
            content,
        } = changes;

        if let Some(author) = author {
            self.author = author;
        }
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
    }

    pub fn like(&mut self) {
        self.likes = self.likes.saturating_add(1);
    }
}

impl CreatePost {
    pub fn new(
        author: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        Ok(Self {
            author: required("author", author.into())?,
            title: required("title", title.into())?,
            content: required("content", content.into())?,
        })
    }
}

impl PostChanges {
    #[must_use]
    pub fn without_blank_fields(self) -> Self {
        let keep = |field: Option<String>| field.filter(|value| !value.trim().is_empty());

        Self {
            author: keep(self.author),
            title: keep(self.title),
            content: keep(self.content),
        }
    }
}

fn required(field: &'static str, value: String) -> Result<String, ModelValidationError> {
    if value.trim().is_empty() {
        Err(ModelValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}
