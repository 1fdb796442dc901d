//! Catch-all handler for requests no route matches.
//!
//! Unknown paths answer with the JSON error envelope rather than Actix's
//! empty 404, so clients always get a `code` and the request's trace id.

use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

use crate::domain::Error;
use crate::inbound::http::ApiResult;

/// Default service: reports the unmatched method and path as `not_found`.
pub async fn unmatched_route(req: HttpRequest) -> ApiResult<HttpResponse> {
    let method = req.method().as_str();
    let path = req.path();
    Err(Error::not_found(format!("no route for {method} {path}"))
        .with_details(json!({ "method": method, "path": path })))
}
