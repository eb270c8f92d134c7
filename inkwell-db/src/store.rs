use crate::record::PostRecord;
use inkwell_common::model::post::{CreatePost, Post, PostChanges, PostId};
use serde::Serialize;
use serde_json::{Serializer, Value, ser::PrettyFormatter};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, error, warn};

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Posts file could not be accessed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Posts file could not be (de)serialized: {0}")]
    Json(#[from] serde_json::Error),
    #[error("A post with id {0} already exists")]
    DuplicateId(PostId),
    #[error("No post ids are left to assign")]
    IdsExhausted,
}

#[derive(Debug)]
pub struct PostStore {
    path: PathBuf,
    posts: Vec<Post>,
    next_id: Option<PostId>,
}

impl PostStore {
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            posts: Vec::new(),
            next_id: Some(PostId::new(1)),
        };
        store.load();

        store
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn next_id(&self) -> Option<PostId> {
        self.next_id
    }

    /// A missing or malformed file yields an empty collection.
    pub fn load(&mut self) {
        self.posts = match self.read_posts() {
            Ok(posts) => posts,
            Err(StoreError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Posts file not found, starting empty");
                Vec::new()
            }
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "Could not load posts, starting empty");
                Vec::new()
            }
        };

        self.next_id = match self.posts.last() {
            Some(post) => post.id.next(),
            None => Some(PostId::new(1)),
        };

        debug!(path = %self.path.display(), count = self.posts.len(), "Loaded posts");
    }

    fn read_posts(&self) -> Result<Vec<Post>> {
        let contents = fs::read_to_string(&self.path)?;
        let records: Vec<Value> = serde_json::from_str(&contents)?;

        let mut posts = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match PostRecord::parse(record) {
                Ok(post) => posts.push(post),
                Err(err) => warn!(index, error = %err, "Skipping invalid post record"),
            }
        }

        // Stable, so the first of several posts sharing an id is the one kept.
        posts.sort_by_key(|post| post.id);
        let total = posts.len();
        posts.dedup_by_key(|post| post.id);
        if posts.len() < total {
            warn!(
                skipped = total - posts.len(),
                "Skipping post records with duplicate ids"
            );
        }

        Ok(posts)
    }

    pub fn save(&self) {
        if let Err(err) = self.try_save() {
            error!(path = %self.path.display(), error = %err, "Could not save posts");
        }
    }

    /// Like [`PostStore::save`], but hands the failure to the caller.
    pub fn try_save(&self) -> Result<()> {
        let mut json = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut json, PrettyFormatter::with_indent(b"    "));
        self.posts.serialize(&mut serializer)?;

        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), count = self.posts.len(), "Saved posts");

        Ok(())
    }

    #[must_use]
    pub fn find_by_id(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    fn position(&self, id: PostId) -> Option<usize> {
        self.posts.iter().position(|post| post.id == id)
    }

    pub fn add(&mut self, post: Post) -> Result<&Post> {
        let index = match self.posts.binary_search_by_key(&post.id, |post| post.id) {
            Ok(_) => return Err(StoreError::DuplicateId(post.id)),
            Err(index) => index,
        };

        if self.next_id.is_some_and(|next_id| next_id <= post.id) {
            self.next_id = post.id.next();
        }
        self.posts.insert(index, post);
        self.save();

        Ok(&self.posts[index])
    }

    pub fn create(&mut self, post: CreatePost) -> Result<&Post> {
        let id = self.next_id.ok_or(StoreError::IdsExhausted)?;

        self.next_id = id.next();
        self.posts.push(Post::new(id, post));
        self.save();

        let index = self.posts.len() - 1;
        Ok(&self.posts[index])
    }

    pub fn update(&mut self, id: PostId, changes: PostChanges) -> Option<&Post> {
        let index = self.position(id)?;

        self.posts[index].apply(changes);
        self.save();

        Some(&self.posts[index])
    }

    pub fn delete(&mut self, id: PostId) -> Option<Post> {
        let index = self.position(id)?;

        let post = self.posts.remove(index);
        self.save();

        Some(post)
    }

    pub fn increment_likes(&mut self, id: PostId) -> Option<&Post> {
        let index = self.position(id)?;

        self.posts[index].like();
        self.save();

        Some(&self.posts[index])
    }
}
