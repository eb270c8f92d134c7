use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{FormRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use handlebars::{RenderError, html_escape};
use html::Html;
use inkwell_common::model::{ModelValidationError, post::PostId};
use inkwell_db::{client::DbClient, store::StoreError};
use std::sync::Arc;
use templates::Templates;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::error;

mod html;
mod routes;
pub mod templates;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    pub templates: Arc<Templates>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub fn app(state: ServerState) -> Router {
    routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming form rejected: {0}")]
    FormRejection(#[from] FormRejection),
    #[error("All fields are required: {0}")]
    Validation(#[from] ModelValidationError),
    #[error("Page could not be rendered: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(PostId),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::FormRejection(_) | ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Store(StoreError::DuplicateId(_)) => StatusCode::CONFLICT,
            ServerError::Render(_) | ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_page(status: StatusCode, message: &str) -> String {
    let message = html_escape(message);
    format!(
        "<!DOCTYPE html>\n\
        <html lang=\"en\">\n\
        <head><meta charset=\"utf-8\"><title>{status}</title></head>\n\
        <body>\n\
        <h1>{status}</h1>\n\
        <p>{message}</p>\n\
        <a href=\"/\">Back to all posts</a>\n\
        </body>\n\
        </html>\n"
    )
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let message = if status.is_server_error() {
            "Something went wrong on our side.".to_owned()
        } else {
            self.to_string()
        };

        (status, Html(error_page(status, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::{ServerState, app, templates::Templates};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use inkwell_common::model::post::CreatePost;
    use inkwell_db::client::DbClient;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        _dir: TempDir,
        db: Arc<DbClient>,
        router: Router,
    }

    fn test_app() -> TestApp {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(DbClient::open(dir.path().join("posts.json")));
        let state = ServerState {
            db_client: Arc::clone(&db),
            templates: Arc::new(Templates::new().unwrap()),
        };

        TestApp {
            _dir: dir,
            db,
            router: app(state),
        }
    }

    impl TestApp {
        async fn seed(&self, title: &str) -> u64 {
            self.db
                .create_post(&CreatePost::new("Ada", title, "Body").unwrap())
                .await
                .unwrap()
                .id
                .get()
        }

        async fn get(&self, uri: &str) -> (StatusCode, String) {
            let request = Request::get(uri).body(Body::empty()).unwrap();
            self.send(request).await
        }

        async fn post_form(&self, uri: &str, form: &str) -> (StatusCode, String) {
            let request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_owned()))
                .unwrap();
            self.send(request).await
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();

            (status, String::from_utf8(bytes.to_vec()).unwrap())
        }
    }

    #[tokio::test]
    async fn index_lists_posts() {
        let app = test_app();
        app.seed("First post").await;
        app.seed("Second post").await;

        let (status, body) = app.get("/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.find("First post").unwrap() < body.find("Second post").unwrap());
    }

    #[tokio::test]
    async fn add_form_renders() {
        let app = test_app();

        let (status, body) = app.get("/add").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"action="/add""#));
    }

    #[tokio::test]
    async fn add_creates_post_and_redirects() {
        let app = test_app();

        let (status, _) = app
            .post_form("/add", "author=Ada&title=Hello+there&content=Body")
            .await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        let posts = app.db.fetch_posts().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 1.into());
        assert_eq!(posts[0].title, "Hello there");
    }

    #[tokio::test]
    async fn add_requires_all_fields() {
        let app = test_app();

        let (status, body) = app.post_form("/add", "author=Ada&title=&content=Body").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("All fields are required"));

        let (status, _) = app.post_form("/add", "author=Ada").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(app.db.fetch_posts().await.is_empty());
    }

    #[tokio::test]
    async fn like_increments_and_redirects() {
        let app = test_app();
        let id = app.seed("Likeable").await;

        let (status, _) = app.get(&format!("/like/{id}")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        app.get(&format!("/like/{id}")).await;

        assert_eq!(app.db.fetch_post(id.into()).await.unwrap().likes, 2);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = test_app();

        for uri in ["/like/42", "/delete/42", "/update/42"] {
            let (status, body) = app.get(uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body.contains("42"), "{uri}");
        }

        let (status, _) = app.post_form("/update/42", "title=New").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let app = test_app();

        let (status, _) = app.get("/like/abc").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = test_app();

        let (status, _) = app.get("/nowhere").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_post() {
        let app = test_app();
        let id = app.seed("Doomed").await;

        let (status, _) = app.get(&format!("/delete/{id}")).await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(app.db.fetch_post(id.into()).await.is_none());
    }

    #[tokio::test]
    async fn update_form_is_prefilled() {
        let app = test_app();
        let id = app.seed("Original").await;

        let (status, body) = app.get(&format!("/update/{id}")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"value="Original""#));
    }

    #[tokio::test]
    async fn update_merges_non_blank_fields() {
        let app = test_app();
        let id = app.seed("Original").await;

        let (status, _) = app
            .post_form(&format!("/update/{id}"), "author=&title=Updated+Title")
            .await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        let post = app.db.fetch_post(id.into()).await.unwrap();
        assert_eq!(post.title, "Updated Title");
        assert_eq!(post.author, "Ada");
        assert_eq!(post.content, "Body");
    }

    #[tokio::test]
    async fn update_rejects_id_field() {
        let app = test_app();
        let id = app.seed("Original").await;

        let (status, _) = app
            .post_form(&format!("/update/{id}"), "id=99&title=Hijack")
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.db.fetch_post(id.into()).await.unwrap().title, "Original");
        assert!(app.db.fetch_post(99.into()).await.is_none());
    }
}
