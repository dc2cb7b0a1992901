use reqwest::{Client, Response, StatusCode};
use std::io;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read workbook: {0}")]
    Excel(String),
}

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    concat!("DataFetch/", env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP client shared by every fetch of a run
pub fn build_client() -> Result<Client, FetchError> {
    Ok(Client::builder().user_agent(get_user_agent()).build()?)
}

/// Issue a GET and reject anything that is not a success status
pub async fn fetch(client: &Client, url: &str) -> Result<Response, FetchError> {
    debug!(url, "sending GET");
    let response = client.get(url).send().await?;
    let status = response.status();
    debug!(url, %status, "response received");

    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(response)
}

pub async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    Ok(fetch(client, url).await?.text().await?)
}

/// Fetch the body and require it to be valid UTF-8
pub async fn fetch_utf8(client: &Client, url: &str) -> Result<String, FetchError> {
    let bytes = fetch_bytes(client, url).await?;
    String::from_utf8(bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    Ok(fetch(client, url).await?.bytes().await?.to_vec())
}

pub async fn fetch_json(client: &Client, url: &str) -> Result<serde_json::Value, FetchError> {
    let bytes = fetch_bytes(client, url).await?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hello.txt"))
            .and(header("user-agent", get_user_agent()))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let body = fetch_text(&client, &format!("{}/hello.txt", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let err = fetch_bytes(&client, &format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let err = fetch_json(&client, &format!("{}/broken.json", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latin1.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x61, 0xff, 0x62]))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let err = fetch_utf8(&client, &format!("{}/latin1.csv", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = build_client().unwrap();
        let err = fetch_bytes(&client, "http://127.0.0.1:9/nothing")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
