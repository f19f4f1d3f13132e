use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, Path},
    http::{Response, StatusCode, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::http_server::{
    error::{PAGE_NOT_FOUND, error_response},
    flash::{self, Notice},
};

pub mod artists;
pub mod home;
pub mod shows;
pub mod venues;

/// A rendered view: the pending flash notice plus the page data.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub notice: Option<Notice>,
    pub data: T,
}

pub fn render<T: Serialize>(jar: CookieJar, data: T) -> (CookieJar, Json<Page<T>>) {
    let (jar, notice) = flash::take(jar);
    (jar, Json(Page { notice, data }))
}

#[derive(Debug, Serialize)]
pub struct SearchPage<T> {
    pub search_term: String,
    pub results: T,
}

/// Values for an edit form, with the id of the record being edited.
#[derive(Debug, Serialize)]
pub struct EditPage<T> {
    pub id: i64,
    pub form: T,
}

/// Numeric record id from the path. Anything else is an unknown page.
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub i64);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = Response<Body>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                log::debug!("Unroutable id in {}: {rejection}", parts.uri.path());
                Err(error_response(StatusCode::NOT_FOUND, PAGE_NOT_FOUND))
            }
        }
    }
}
