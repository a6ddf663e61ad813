use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::api::auth::{AuthManager, TokenPair};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Async client for the landlord API.
///
/// All collection stores share one `ApiClient`; it owns the HTTP connection
/// pool and the signed-in session.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    auth: AuthManager,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            auth: AuthManager::default(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // --- authentication ---------------------------------------------------

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.config.endpoint("/authenticator/landlord/signin"))
            .json(&json!({ "email": email.trim().to_lowercase(), "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::from_status(status, read_error_message(response).await));
        }

        let tokens: TokenPair = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("sign-in response: {e}")))?;
        self.auth.store(tokens).await;
        tracing::info!("Signed in");
        Ok(())
    }

    pub async fn sign_up(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<()> {
        self.send_unauthenticated(
            Method::POST,
            "/authenticator/landlord/signup",
            Some(&json!({
                "firstname": first_name.trim(),
                "lastname": last_name.trim(),
                "email": email.trim().to_lowercase(),
                "password": password,
            })),
        )
        .await
        .map(|_| ())
    }

    pub async fn sign_out(&self) -> Result<()> {
        // Best effort server-side; the local session is dropped regardless.
        let result = self
            .send(Method::DELETE, "/authenticator/landlord/signout", None)
            .await;
        self.auth.clear().await;
        match result {
            Ok(_) | Err(Error::Unauthorized(_)) => Ok(()),
            Err(other) => Err(other),
        }
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.send_unauthenticated(
            Method::POST,
            "/authenticator/landlord/forgotpassword",
            Some(&json!({ "email": email.trim().to_lowercase() })),
        )
        .await
        .map(|_| ())
    }

    pub async fn reset_password(&self, reset_token: &str, password: &str) -> Result<()> {
        self.send_unauthenticated(
            Method::PATCH,
            "/authenticator/landlord/resetpassword",
            Some(&json!({ "resetToken": reset_token, "password": password })),
        )
        .await
        .map(|_| ())
    }

    pub async fn signed_in(&self) -> bool {
        self.auth.access_token().await.is_some()
    }

    // --- typed request helpers --------------------------------------------

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.send(Method::GET, path, None).await?;
        decode(path, value)
    }

    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let value = self.send(Method::POST, path, Some(body)).await?;
        decode(path, value)
    }

    pub async fn put_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let value = self.send(Method::PUT, path, Some(body)).await?;
        decode(path, value)
    }

    pub async fn patch_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let value = self.send(Method::PATCH, path, Some(body)).await?;
        decode(path, value)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }

    /// Raw download, used for `/documents{path}` (PDFs, images).
    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let (token, generation) = self
            .auth
            .access_token()
            .await
            .ok_or_else(|| Error::Unauthorized("not signed in".to_string()))?;

        let mut response = self
            .http
            .get(self.config.endpoint(path))
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.config.refresh_retry_once {
            let token = self.auth.refresh(&self.http, &self.config, generation).await?;
            response = self
                .http
                .get(self.config.endpoint(path))
                .bearer_auth(&token)
                .send()
                .await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(Error::from_status(status, read_error_message(response).await));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Multipart upload passthrough, used for `/documents{path}`. The file
    /// travels as-is; the server owns parsing and storage.
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Value> {
        if file_name.trim().is_empty() {
            return Err(Error::Validation("file name is required".to_string()));
        }
        let build_form = |bytes: Vec<u8>| -> Result<reqwest::multipart::Form> {
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name.to_string())
                .mime_str(content_type)
                .map_err(|_| {
                    Error::Validation(format!("invalid content type '{content_type}'"))
                })?;
            Ok(reqwest::multipart::Form::new().part("file", part))
        };

        let (token, generation) = self
            .auth
            .access_token()
            .await
            .ok_or_else(|| Error::Unauthorized("not signed in".to_string()))?;

        let mut response = self
            .http
            .post(self.config.endpoint(path))
            .bearer_auth(&token)
            .multipart(build_form(bytes.clone())?)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.config.refresh_retry_once {
            let token = self.auth.refresh(&self.http, &self.config, generation).await?;
            response = self
                .http
                .post(self.config.endpoint(path))
                .bearer_auth(&token)
                .multipart(build_form(bytes)?)
                .send()
                .await?;
        }

        read_response(path, response).await
    }

    // --- request core -----------------------------------------------------

    /// One authenticated request. On a 401 the access token is refreshed
    /// (single-flight across concurrent callers) and the request is retried
    /// exactly once; there is no other retry policy.
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let (token, generation) = self
            .auth
            .access_token()
            .await
            .ok_or_else(|| Error::Unauthorized("not signed in".to_string()))?;

        let response = self.execute(method.clone(), path, body, Some(&token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED || !self.config.refresh_retry_once {
            return read_response(path, response).await;
        }

        let token = self.auth.refresh(&self.http, &self.config, generation).await?;
        let response = self.execute(method, path, body, Some(&token)).await?;
        read_response(path, response).await
    }

    async fn send_unauthenticated(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let response = self.execute(method, path, body, None).await?;
        read_response(path, response).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut request = self.http.request(method, self.config.endpoint(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| {
            tracing::error!(path, error = %e, "API request failed");
            Error::Http(e)
        })
    }
}

async fn read_response(path: &str, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let message = read_error_message(response).await;
        tracing::debug!(path, status = status.as_u16(), message, "API error response");
        return Err(Error::from_status(status, message));
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| Error::Decode(format!("{path}: {e}")))
}

async fn read_error_message(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap_or(Value::Null);
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::Decode(format!("{path}: {e}")))
}
