//! HTTP request handlers for doorgate server

use bytes::Bytes;
use doorgate_core::*;
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use crate::middleware::require_auth;
use crate::response::{error_response, json_response, message_response, BoxBody};
use crate::state::AppState;

/// Largest request body accepted
const MAX_BODY_BYTES: usize = 16 * 1024;

const ROUTES: [&str; 5] = ["/", "/health", "/register", "/login", "/door"];

/// Main request handler
pub async fn handle_request<B>(req: Request<B>, state: Arc<AppState>) -> Response<BoxBody>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Handling {} {}", method, path);

    let result = match (&method, path.as_str()) {
        (&Method::GET, "/") => Ok(handle_index()),
        (&Method::GET, "/health") => Ok(handle_health()),
        (&Method::POST, "/register") => handle_register(req, &state).await,
        (&Method::POST, "/login") => handle_login(req, &state).await,
        (&Method::GET, "/door") => {
            let query = req.uri().query().unwrap_or("").to_string();
            require_auth(&state.gate, req.headers(), |username| {
                handle_door(&state, &query, username)
            })
            .await
        }
        (_, path) if ROUTES.contains(&path) => Ok(message_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed",
        )),
        _ => Ok(message_response(StatusCode::NOT_FOUND, "not found")),
    };

    let response = match result {
        Ok(response) => response,
        Err(e) => error_response(&e),
    };

    info!("{} {} -> {}", method, path, response.status());
    response
}

/// Service banner
fn handle_index() -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        json!({
            "message": "welcome to the doorgate access control API",
            "endpoints": {
                "register": {"method": "POST", "description": "register a user"},
                "login": {"method": "POST", "description": "log in and receive a token"},
                "door": {"method": "GET", "description": "open (open=1) or close (open=2) the door"}
            }
        }),
    )
}

/// Health check handler
fn handle_health() -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "service": "doorgate",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }),
    )
}

/// POST /register
async fn handle_register<B>(req: Request<B>, state: &Arc<AppState>) -> Result<Response<BoxBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let credentials = read_credentials(req).await?;

    let state = state.clone();
    let username = run_blocking(move || state.auth.register(credentials)).await?;
    debug!("Registration complete for {}", username);

    Ok(message_response(StatusCode::OK, "registration successful"))
}

/// POST /login
async fn handle_login<B>(req: Request<B>, state: &Arc<AppState>) -> Result<Response<BoxBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let credentials = read_credentials(req).await?;

    let state = state.clone();
    let issued = run_blocking(move || state.auth.login(credentials)).await?;

    Ok(json_response(
        StatusCode::OK,
        json!({
            "message": "login successful",
            "token": issued.token,
            "expires_in": issued.expires_in
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct DoorQuery {
    open: Option<String>,
}

/// GET /door, only reached with an authenticated username
async fn handle_door(state: &AppState, query: &str, username: String) -> Result<Response<BoxBody>> {
    let action = parse_door_query(query)?;
    state.door.actuate(action, &username);

    Ok(json_response(
        StatusCode::OK,
        json!({
            "message": format!("{} door {} successfully", username, action.past_tense()),
            "action": action.to_string()
        }),
    ))
}

/// Extract the door action from a raw query string
fn parse_door_query(query: &str) -> Result<DoorAction> {
    let parsed: DoorQuery = serde_urlencoded::from_str(query)
        .map_err(|_| ValidationError::InvalidDoorParameter)?;

    match parsed.open {
        Some(value) => DoorAction::from_query_value(&value),
        None => Err(ValidationError::InvalidDoorParameter.into()),
    }
}

/// Read and decode a `{username, password}` JSON body
async fn read_credentials<B>(req: Request<B>) -> Result<Credentials>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if !is_json(req.headers()) {
        return Err(ValidationError::BodyNotJson.into());
    }

    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            debug!("Failed to read request body: {}", e);
            ValidationError::BodyNotJson
        })?
        .to_bytes();

    parse_credentials(&body)
}

/// Empty objects and non-objects are rejected like malformed JSON
fn parse_credentials(body: &Bytes) -> Result<Credentials> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ValidationError::BodyNotJson)?;

    match &value {
        serde_json::Value::Object(map) if !map.is_empty() => {}
        _ => return Err(ValidationError::BodyNotJson.into()),
    }

    serde_json::from_value(value).map_err(|_| ValidationError::BodyNotJson.into())
}

/// `application/json`, optionally with parameters, or any `+json` type
fn is_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Run CPU-heavy auth work off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DoorgateError::Internal(format!("blocking task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_parse_door_query() {
        assert_eq!(parse_door_query("open=1").unwrap(), DoorAction::Open);
        assert_eq!(parse_door_query("open=2").unwrap(), DoorAction::Close);
        assert_eq!(parse_door_query("extra=x&open=2").unwrap(), DoorAction::Close);

        for bad in ["", "open=", "open=0", "open=3", "open=abc", "open=1.5", "action=open", "open=1&open=2"] {
            assert!(parse_door_query(bad).is_err(), "query {:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_parse_credentials() {
        let creds = parse_credentials(&Bytes::from_static(br#"{"username":"alice01","password":"Secret1"}"#)).unwrap();
        assert_eq!(creds, Credentials::new("alice01", "Secret1"));

        // missing fields default to empty and are caught by validation later
        let creds = parse_credentials(&Bytes::from_static(br#"{"username":"alice01"}"#)).unwrap();
        assert_eq!(creds.password, "");

        let bad_bodies: [&[u8]; 6] = [
            b"",
            b"not json",
            b"{}",
            b"[]",
            b"\"alice\"",
            br#"{"username":123,"password":"x"}"#,
        ];
        for bad in bad_bodies {
            let err = parse_credentials(&Bytes::copy_from_slice(bad)).unwrap_err();
            assert!(matches!(err, DoorgateError::Validation(ValidationError::BodyNotJson)));
        }
    }

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("Application/JSON; charset=utf-8"));
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/merge-patch+json"));
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
    }
}
