use crate::server::{
    Result, ServerError, ServerRouter,
    html::{Form, Html},
    templates::Templates,
};
use axum::{extract::State, response::Redirect};
use axum_extra::routing::{RouterExt, TypedPath};
use inkwell_common::model::post::{CreatePost, Post, PostChanges, PostId};
use inkwell_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(index)
        .typed_get(add_post_form)
        .typed_post(add_post)
        .typed_get(update_post_form)
        .typed_post(update_post)
        .typed_get(delete_post)
        .typed_get(like_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/", rejection(ServerError))]
struct IndexPath();

#[derive(Serialize)]
struct IndexContext {
    posts: Vec<Post>,
}

async fn index(
    IndexPath(): IndexPath,
    State(db): State<Arc<DbClient>>,
    State(templates): State<Arc<Templates>>,
) -> Result<Html> {
    let posts = db.fetch_posts().await;

    Ok(templates.render("index", &IndexContext { posts })?)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/add", rejection(ServerError))]
struct AddPostPath();

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
struct AddPostForm {
    author: Option<String>,
    title: Option<String>,
    content: Option<String>,
}

async fn add_post_form(
    AddPostPath(): AddPostPath,
    State(templates): State<Arc<Templates>>,
) -> Result<Html> {
    Ok(templates.render("add", &())?)
}

async fn add_post(
    AddPostPath(): AddPostPath,
    State(db): State<Arc<DbClient>>,
    Form(form): Form<AddPostForm>,
) -> Result<Redirect> {
    let post = CreatePost::new(
        form.author.unwrap_or_default(),
        form.title.unwrap_or_default(),
        form.content.unwrap_or_default(),
    )?;

    let post = db.create_post(&post).await?;
    info!(id = %post.id, "Created post");

    Ok(Redirect::to(IndexPath().to_uri().path()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/update/{id}", rejection(ServerError))]
struct UpdatePostPath {
    id: PostId,
}

#[derive(Serialize)]
struct UpdatePostContext {
    post: Post,
}

async fn update_post_form(
    UpdatePostPath { id }: UpdatePostPath,
    State(db): State<Arc<DbClient>>,
    State(templates): State<Arc<Templates>>,
) -> Result<Html> {
    let post = db
        .fetch_post(id)
        .await
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(templates.render("update", &UpdatePostContext { post })?)
}

async fn update_post(
    UpdatePostPath { id }: UpdatePostPath,
    State(db): State<Arc<DbClient>>,
    Form(changes): Form<PostChanges>,
) -> Result<Redirect> {
    let changes = changes.without_blank_fields();

    db.update_post(id, &changes)
        .await
        .ok_or(ServerError::PostByIdNotFound(id))?;
    info!(%id, "Updated post");

    Ok(Redirect::to(IndexPath().to_uri().path()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/delete/{id}", rejection(ServerError))]
struct DeletePostPath {
    id: PostId,
}

async fn delete_post(
    DeletePostPath { id }: DeletePostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Redirect> {
    db.delete_post(id)
        .await
        .ok_or(ServerError::PostByIdNotFound(id))?;
    info!(%id, "Deleted post");

    Ok(Redirect::to(IndexPath().to_uri().path()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/like/{id}", rejection(ServerError))]
struct LikePostPath {
    id: PostId,
}

async fn like_post(
    LikePostPath { id }: LikePostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Redirect> {
    db.like_post(id)
        .await
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Redirect::to(IndexPath().to_uri().path()))
}
