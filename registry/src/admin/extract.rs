//! `Json` / `Query` extractors whose rejections use the API's JSON error body.

use axum::extract::{FromRequest, FromRequestParts};

use super::ApiErr;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErr))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiErr))]
pub struct ApiQuery<T>(pub T);
