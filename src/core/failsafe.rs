use crate::utils::error::Result;
use crate::utils::validation::validate_timeout;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(5);

/// 分母缺省或為零時退回 1，確保永遠得到有限的結果
pub fn safe_division(numerator: f64, denominator: Option<f64>) -> f64 {
    let denominator = match denominator {
        Some(d) if d == 0.0 => {
            tracing::warn!("Denominator was zero. Defaulted to 1.");
            1.0
        }
        Some(d) => d,
        None => 1.0,
    };
    numerator / denominator
}

pub fn fail_response(data: &str) -> Value {
    json!({"status": "fail", "data": data})
}

/// 失敗時回傳預設結果而不是錯誤的 HTTP 用戶端
#[derive(Debug, Clone)]
pub struct SafeApiClient {
    client: Client,
    timeout: Duration,
}

impl SafeApiClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        validate_timeout("timeout", timeout)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 逾時與其他錯誤分別回傳不同的 fail-safe 結果
    pub async fn safe_api_call(&self, url: &str) -> Value {
        let outcome = async {
            let response = self.client.get(url).send().await?;
            response.json::<Value>().await
        }
        .await;

        match outcome {
            Ok(value) => value,
            Err(e) if e.is_timeout() => {
                tracing::warn!(
                    "⏱️ Request timed out after {:?}. Using fail-safe response.",
                    self.timeout
                );
                fail_response("Request timed out")
            }
            Err(e) => {
                tracing::warn!("An error occurred: {}", e);
                fail_response("Error in request")
            }
        }
    }

    /// 取得 JSON；任何失敗都依類型寫入日誌並回傳 `None`
    pub async fn fetch_data(&self, url: &str) -> Option<Value> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                log_request_failure(url, &e);
                return None;
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                log_request_failure(url, &e);
                return None;
            }
        };

        match response.json::<Value>().await {
            Ok(data) => Some(data),
            Err(e) if e.is_decode() => {
                tracing::error!("JSONDecodeError: Failed to decode JSON response from {}", url);
                None
            }
            Err(e) => {
                log_request_failure(url, &e);
                None
            }
        }
    }
}

fn log_request_failure(url: &str, e: &reqwest::Error) {
    if let Some(status) = e.status() {
        tracing::error!("HTTPError: {} for URL {}", status, url);
    } else if e.is_timeout() {
        tracing::error!("Timeout: The request to {} timed out.", url);
    } else if e.is_connect() {
        tracing::error!("ConnectionError: Failed to connect to {}", url);
    } else {
        tracing::error!(
            "RequestException: An error occurred while handling the request to {}. Error: {}",
            url,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_safe_division() {
        assert_eq!(safe_division(10.0, Some(2.0)), 5.0);
        assert_eq!(safe_division(10.0, None), 10.0);
        assert_eq!(safe_division(10.0, Some(0.0)), 10.0);
        assert_eq!(safe_division(10.0, Some(-0.0)), 10.0);
    }

    #[test]
    fn test_client_rejects_zero_timeout() {
        assert!(SafeApiClient::new(Duration::ZERO).is_err());
        assert_eq!(
            SafeApiClient::new(DEFAULT_API_TIMEOUT).unwrap().timeout(),
            DEFAULT_API_TIMEOUT
        );
    }

    #[tokio::test]
    async fn test_safe_api_call_returns_payload() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/data");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"status": "ok", "items": [1, 2]}));
        });

        let client = SafeApiClient::new(DEFAULT_API_TIMEOUT).unwrap();
        let value = client.safe_api_call(&server.url("/data")).await;

        api_mock.assert();
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn test_safe_api_call_timeout_fallback() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_millis(800))
                .json_body(json!({"status": "ok"}));
        });

        let client = SafeApiClient::new(Duration::from_millis(100)).unwrap();
        let value = client.safe_api_call(&server.url("/slow")).await;

        assert_eq!(value, fail_response("Request timed out"));
    }

    #[tokio::test]
    async fn test_safe_api_call_non_json_fallback() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/html");
            then.status(200).body("<html></html>");
        });

        let client = SafeApiClient::new(DEFAULT_API_TIMEOUT).unwrap();
        let value = client.safe_api_call(&server.url("/html")).await;

        assert_eq!(value, fail_response("Error in request"));
    }

    #[tokio::test]
    async fn test_fetch_data_handles_http_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let client = SafeApiClient::new(DEFAULT_API_TIMEOUT).unwrap();
        assert!(client.fetch_data(&server.url("/missing")).await.is_none());
        api_mock.assert();
    }

    #[tokio::test]
    async fn test_fetch_data_handles_bad_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(200).body("{\"unterminated\": ");
        });

        let client = SafeApiClient::new(DEFAULT_API_TIMEOUT).unwrap();
        assert!(client.fetch_data(&server.url("/broken")).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_data_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ok");
            then.status(200).json_body(json!({"id": 1}));
        });

        let client = SafeApiClient::new(DEFAULT_API_TIMEOUT).unwrap();
        assert_eq!(
            client.fetch_data(&server.url("/ok")).await,
            Some(json!({"id": 1}))
        );
    }
}
