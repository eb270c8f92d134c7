use crate::server::ServerError;
use axum::{
    Form as AxumForm,
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::ContentType;

/// A form body whose rejection is reported as a [`ServerError`].
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumForm), rejection(ServerError))]
pub struct Form<T>(pub T);

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct Html(pub String);

impl IntoResponse for Html {
    fn into_response(self) -> Response {
        (TypedHeader(ContentType::html()), self.0).into_response()
    }
}
