use axum::{
    Json,
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::FormRejection;
use serde::Serialize;

use crate::error::Error;

// A generic error report
// Produced via `Err(some_err).wrap_err("Some context")`
// or `Err(color_eyre::eyre::Report::new(SomeError))`
pub struct Report(color_eyre::Report);

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<E> From<E> for Report
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response<Body> {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

// Tell axum how to convert `Report` into a response.
impl IntoResponse for Report {
    fn into_response(self) -> Response<Body> {
        let err = self.0;

        if let Some(Error::NotFound { entity, id }) = err.downcast_ref::<Error>() {
            log::warn!("Lookup failed: {entity} {id} not found");
            return error_response(StatusCode::NOT_FOUND, format!("{entity} {id} not found"));
        }

        log::error!("{err:?}");

        // Fallback
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
    }
}

pub const PAGE_NOT_FOUND: &str = "Page not found";

/// Fallback for unmapped routes.
pub async fn not_found() -> Response<Body> {
    error_response(StatusCode::NOT_FOUND, PAGE_NOT_FOUND)
}

/// Log a submission whose body could not be decoded.
pub fn log_rejected_form(action: &str, rejection: &FormRejection) {
    log::warn!("{action} rejected: {rejection}");
}

/// Log a failed mutation. Users only ever see the generic notice.
pub fn log_mutation_failure(action: &str, err: &Error) {
    match err {
        Error::Validation(errors) => log::warn!("{action} rejected: {errors}"),
        Error::NotFound { .. } => log::warn!("{action} failed: {err}"),
        Error::Storage(db_err) => log::error!("{action} rolled back: {db_err:?}"),
    }
}
