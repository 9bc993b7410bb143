use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub result: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error payload returned by the service on 4xx/5xx.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub struct CalculatorClient {
    client: Client,
    base_url: String,
}

impl CalculatorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Add two operands and return the stored result.
    pub async fn add(&self, a: f64, b: f64) -> Result<CalculationResponse, Box<dyn std::error::Error>> {
        let resp = self.client
            .post(format!("{}/add", self.base_url))
            .query(&[("a", a), ("b", b)])
            .send()
            .await?;

        Self::decode(resp).await
    }

    /// Check service and datastore health.
    pub async fn health(&self) -> Result<HealthResponse, Box<dyn std::error::Error>> {
        let resp = self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        Self::decode(resp).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(resp: Response) -> Result<T, Box<dyn std::error::Error>> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.detail)
                .unwrap_or(text);
            return Err(format!("Service returned {}: {}", status, detail).into());
        }

        Ok(serde_json::from_str(&text)?)
    }
}
