//! Authentication middleware for protected handlers

use doorgate_core::{AuthGate, Result};
use hyper::header::AUTHORIZATION;
use hyper::{HeaderMap, Response};
use std::future::Future;

use crate::response::BoxBody;

/// Run `handler` with the authenticated username, or fail with the gate's
/// rejection without calling it.
pub async fn require_auth<F, Fut>(
    gate: &AuthGate,
    headers: &HeaderMap,
    handler: F,
) -> Result<Response<BoxBody>>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Response<BoxBody>>>,
{
    // a header that is not valid UTF-8 counts as absent
    let credential = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let username = gate.authenticate(credential).into_result()?;
    handler(username).await
}
