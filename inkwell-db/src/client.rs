use crate::store::{PostStore, Result};
use inkwell_common::model::post::{CreatePost, Post, PostChanges, PostId};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Every method holds the lock for its whole lookup, mutation and save.
#[derive(Debug)]
pub struct DbClient {
    store: Mutex<PostStore>,
}

impl DbClient {
    #[must_use]
    pub fn new(store: PostStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(PostStore::open(path))
    }

    pub async fn fetch_posts(&self) -> Vec<Post> {
        self.store.lock().await.posts().to_vec()
    }

    pub async fn fetch_post(&self, post_id: PostId) -> Option<Post> {
        self.store.lock().await.find_by_id(post_id).cloned()
    }

    pub async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        self.store.lock().await.create(post.clone()).cloned()
    }

    pub async fn add_post(&self, post: Post) -> Result<Post> {
        self.store.lock().await.add(post).cloned()
    }

    pub async fn update_post(&self, post_id: PostId, changes: &PostChanges) -> Option<Post> {
        self.store
            .lock()
            .await
            .update(post_id, changes.clone())
            .cloned()
    }

    pub async fn delete_post(&self, post_id: PostId) -> Option<Post> {
        self.store.lock().await.delete(post_id)
    }

    pub async fn like_post(&self, post_id: PostId) -> Option<Post> {
        self.store.lock().await.increment_likes(post_id).cloned()
    }

    pub async fn reload(&self) {
        self.store.lock().await.load();
    }

    pub async fn save(&self) {
        self.store.lock().await.save();
    }
}
