use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejections (bad syntax, wrong shape, missing
/// content type) come back as 400 `VALIDATION_ERROR` bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
