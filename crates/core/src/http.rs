//! HTTP helpers shared by the provider bindings.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

/// Sends a request, mapping transport failures into the taxonomy.
pub async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ProviderError> {
    request.send().await.map_err(ProviderError::from_transport)
}

/// Passes a successful response through and classifies any other status.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = retry_after(response.headers());
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".into());
    tracing::warn!(status = status.as_u16(), "provider returned error status");
    Err(ProviderError::from_status(status.as_u16(), body, retry_after))
}

/// Reads a JSON body. Malformed bodies are unclassified, broken transfers are not.
pub async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else {
            ProviderError::from_transport(e)
        }
    })
}

/// Parses a `Retry-After` header given in whole seconds.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use reqwest::header::HeaderValue;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_proxy_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn retry_after_parses_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));
    }

    #[test]
    fn retry_after_ignores_http_dates() {
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
        assert_eq!(retry_after(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn check_status_carries_retry_after_on_429() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let response = send(no_proxy_client().get(server.uri())).await.unwrap();
        let err = check_status(response).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after: Some(d)
            } if d == Duration::from_secs(7)
        ));
    }

    #[tokio::test]
    async fn check_status_keeps_body_for_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let response = send(no_proxy_client().get(server.uri())).await.unwrap();
        let err = check_status(response).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ProviderUnavailable));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let response = send(no_proxy_client().get(server.uri())).await.unwrap();
        let err = json::<serde_json::Value>(response).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
        assert_eq!(err.kind(), None);
    }

    #[tokio::test]
    async fn unreachable_host_is_provider_unavailable() {
        // Port 9 (discard) on localhost is closed in test environments.
        let err = send(no_proxy_client().get("http://127.0.0.1:9"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ProviderUnavailable));
    }
}
