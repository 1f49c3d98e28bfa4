// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the provisioner control plane.

use reqwest::StatusCode;

/// Client failures, split along the exit-code boundary: auth problems are
/// configuration errors (exit 1), everything else is runtime (exit 2).
#[derive(Debug)]
pub enum ClientError {
    Auth(String),
    Request(String),
    Server { status: StatusCode, detail: String },
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Auth(detail) => write!(f, "authentication failed: {detail}"),
            ClientError::Request(detail) => write!(f, "request failed: {detail}"),
            ClientError::Server { status, detail } => write!(f, "server returned {status}: {detail}"),
        }
    }
}

impl std::error::Error for ClientError {}

pub(crate) fn classify(status: StatusCode, detail: String) -> ClientError {
    if status == StatusCode::UNAUTHORIZED {
        ClientError::Auth(detail)
    } else {
        ClientError::Server { status, detail }
    }
}

/// Bearer-authenticated JSON client against one provisioner.
pub struct ApiClient {
    base: String,
    system_key: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(port: u16, system_key: String) -> Self {
        Self {
            base: format!("http://localhost:{port}"),
            system_key,
            http: reqwest::Client::new(),
        }
    }

    async fn read(response: reqwest::Response) -> Result<serde_json::Value, ClientError> {
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .unwrap_or(serde_json::Value::Null);
        if status.is_success() {
            Ok(body)
        } else {
            let detail = body
                .get("detail")
                .and_then(|d| d.as_str())
                .unwrap_or("no detail")
                .to_string();
            Err(classify(status, detail))
        }
    }

    pub async fn get(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base))
            .bearer_auth(&self.system_key)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        Self::read(response).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base))
            .bearer_auth(&self.system_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        Self::read(response).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
