//! Shared request plumbing: error classification and artifact downloads.

use crate::retry::{RetryPolicy, with_retry};
use reqwest::{Client, RequestBuilder, Response};
use std::path::Path;
use storyreel_error::{ProviderError, ProviderErrorKind, StoryreelResult};
use tracing::debug;

/// Longest response body quoted in an error message.
const MAX_ERROR_BODY: usize = 500;

/// Map a transport failure.
pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> ProviderError {
    ProviderError::new(ProviderErrorKind::Http {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Map a response body that did not match the expected shape.
pub(crate) fn decode_error(provider: &str, message: impl Into<String>) -> ProviderError {
    ProviderError::new(ProviderErrorKind::Decode {
        provider: provider.to_string(),
        message: message.into(),
    })
}

/// Pass successful responses through; turn anything else into a
/// [`ProviderErrorKind::Status`] carrying the (truncated) body.
pub(crate) async fn check_status(provider: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push('…');
    }

    Err(ProviderError::new(ProviderErrorKind::Status {
        provider: provider.to_string(),
        status_code: status.as_u16(),
        message: if body.is_empty() {
            status.canonical_reason().unwrap_or("unknown status").to_string()
        } else {
            body
        },
    }))
}

/// Send the request built by `build` with retries, returning the first
/// successful response.
pub(crate) async fn send<F>(
    provider: &'static str,
    policy: &RetryPolicy,
    build: F,
) -> StoryreelResult<Response>
where
    F: Fn() -> RequestBuilder,
{
    with_retry(policy, provider, || {
        let request = build();
        async move {
            let response = request
                .send()
                .await
                .map_err(|e| transport_error(provider, e))?;
            check_status(provider, response).await
        }
    })
    .await
}

/// Send a request and return the full body, retrying failures that happen
/// while the body is streamed as well.
pub(crate) async fn send_for_bytes<F>(
    provider: &'static str,
    policy: &RetryPolicy,
    build: F,
) -> StoryreelResult<Vec<u8>>
where
    F: Fn() -> RequestBuilder,
{
    with_retry(policy, provider, || {
        let request = build();
        async move {
            let response = request
                .send()
                .await
                .map_err(|e| transport_error(provider, e))?;
            let response = check_status(provider, response).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| transport_error(provider, e))?;
            Ok(bytes.to_vec())
        }
    })
    .await
}

/// Fetch a generated artifact and write it to `dest`.
#[tracing::instrument(skip(client, policy), fields(dest = %dest.display()))]
pub(crate) async fn download_to(
    client: &Client,
    policy: &RetryPolicy,
    url: &str,
    dest: &Path,
) -> StoryreelResult<()> {
    let bytes = with_retry(policy, "download", || {
        let request = client.get(url);
        async move {
            let download_error = |message: String| {
                ProviderError::new(ProviderErrorKind::Download {
                    url: url.to_string(),
                    message,
                })
            };
            let response = request
                .send()
                .await
                .map_err(|e| download_error(e.to_string()))?;
            let response = check_status("download", response).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| download_error(e.to_string()))?;
            Ok(bytes)
        }
    })
    .await?;

    crate::artifacts::write_artifact(dest, &bytes).await?;
    debug!(size = bytes.len(), "Downloaded artifact");
    Ok(())
}
