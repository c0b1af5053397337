use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum HttpError {
    #[error("http client error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{url} responded with {status}: {body}")]
    UnexpectedStatus {
        url: String,
        status: StatusCode,
        body: String,
    },
}

/// Builds a client whose requests are bounded by `timeout`, or unbounded for `None`.
pub fn build_client(timeout: Option<Duration>) -> Result<Client, HttpError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

/// Parses `addr` into a base URL that relative paths can be joined onto.
/// Plain `host:port` addresses are assumed to be `http://`.
pub fn base_url(addr: &str) -> Result<Url, HttpError> {
    let addr = addr.trim();
    let mut url = if addr.contains("://") {
        Url::parse(addr)?
    } else {
        Url::parse(&format!("http://{addr}"))?
    };

    // Url::join replaces the last segment unless the path ends with a slash
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Passes successful responses through and turns anything else into an error
/// carrying the response body.
pub async fn ensure_success(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(HttpError::UnexpectedStatus { url, status, body })
}
