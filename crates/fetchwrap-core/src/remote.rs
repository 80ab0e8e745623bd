//! Resource fetching helpers built on top of [`Fetch`].
//!
//! - [`get_resource`] fetches a JSON resource and turns non-2xx responses into [`NetworkError`]
//! - [`submit_form_with_csrf`] fetches a CSRF token from [`CSRF_ENDPOINT`] and submits a form with it

use crate::switch::{Fetch, FetchError};
use crate::types::request::{Credentials, RequestOptions};
use crate::types::response::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Endpoint handing out CSRF tokens.
pub const CSRF_ENDPOINT: &str = "/csrf/";

/// A request that completed with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({status} {status_text})")]
pub struct NetworkError {
    pub status: u16,
    pub status_text: String,
    pub message: String,
}

impl NetworkError {
    pub fn new(response: &Response, message: impl Into<String>) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            message: message.into(),
        }
    }
}

/// Error of a resource helper.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// CSRF token descriptor served by [`CSRF_ENDPOINT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfToken {
    pub token: String,
    /// Form field carrying the token
    pub parameter_name: String,
    /// Header carrying the token
    pub header_name: String,
}

/// Parse the body of an ok response, or fail with a [`NetworkError`] carrying `message`.
pub fn parse_json<T: DeserializeOwned>(response: &Response, message: &str) -> Result<T, RemoteError> {
    if response.ok() {
        Ok(response.json()?)
    } else {
        Err(NetworkError::new(response, message).into())
    }
}

/// Fetch the JSON resource at `path` with same-origin credentials.
pub async fn get_resource<T, F>(fetch: &F, path: &str) -> Result<T, RemoteError>
where
    T: DeserializeOwned,
    F: Fetch,
{
    let options = RequestOptions::new().credentials(Credentials::SameOrigin);
    let response = fetch.fetch(path, options).await?;
    parse_json(&response, &format!("Failed to retrieve resource at {path}"))
}

/// [`get_resource`] that hands any error to `on_failure` before returning it.
pub async fn get_resource_with<T, F, C>(fetch: &F, path: &str, on_failure: C) -> Result<T, RemoteError>
where
    T: DeserializeOwned,
    F: Fetch,
    C: FnOnce(&RemoteError),
{
    let result = get_resource(fetch, path).await;
    if let Err(error) = &result {
        on_failure(error);
    }
    result
}

/// Submit `form` to `url` with a CSRF token.
///
/// The token is fetched from [`CSRF_ENDPOINT`] first, then sent both in the
/// header the server names and as a form field.
pub async fn submit_form_with_csrf<T, F>(
    fetch: &F,
    url: &str,
    method: &str,
    mut form: Map<String, Value>,
) -> Result<T, RemoteError>
where
    T: DeserializeOwned,
    F: Fetch,
{
    let csrf: CsrfToken = get_resource(fetch, CSRF_ENDPOINT).await?;

    form.insert(csrf.parameter_name.clone(), Value::String(csrf.token.clone()));
    let options = RequestOptions::new()
        .method(method)
        .credentials(Credentials::SameOrigin)
        .header("Content-Type", "application/json")
        .header(csrf.header_name, csrf.token)
        .json_body(Value::Object(form));

    let response = fetch.fetch(url, options).await?;
    parse_json(&response, &format!("Failed to submit form to {url}"))
}
