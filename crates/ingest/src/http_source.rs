use std::time::Duration;

use log::debug;
use reqwest::{Client, Url};
use slist_pool::Pool;

use crate::{IngestError, load_from_str};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches a server list over HTTP or HTTPS and adds every line of the body.
pub async fn load_from_url(pool: &Pool, url: &str) -> Result<usize, IngestError> {
    let parsed = Url::parse(url).map_err(|_| IngestError::InvalidUri(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(IngestError::UnsupportedScheme(scheme.to_string())),
    }

    let client = Client::builder()
        .timeout(DEFAULT_FETCH_TIMEOUT)
        .build()
        .map_err(IngestError::Request)?;

    let response = client.get(parsed).send().await.map_err(request_error)?;
    if !response.status().is_success() {
        return Err(IngestError::Status(response.status().as_u16()));
    }

    let body = response.bytes().await.map_err(request_error)?;
    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(load_from_str(pool, &String::from_utf8_lossy(&body)))
}

fn request_error(err: reqwest::Error) -> IngestError {
    if err.is_timeout() {
        IngestError::Timeout(DEFAULT_FETCH_TIMEOUT)
    } else {
        IngestError::Request(err)
    }
}
