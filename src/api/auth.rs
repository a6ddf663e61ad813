use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default)]
struct AuthSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Bumped on every successful refresh or sign-in. Lets a waiter detect
    /// that the token it failed with has already been replaced.
    generation: u64,
}

/// Holds the signed-in session and gates `/refreshtoken` calls.
///
/// Several in-flight requests can hit a 401 at the same time; the mutex plus
/// the generation counter make sure exactly one of them performs the refresh
/// while the rest reuse the replacement token.
#[derive(Debug, Default)]
pub struct AuthManager {
    session: Mutex<AuthSession>,
}

impl AuthManager {
    pub async fn access_token(&self) -> Option<(String, u64)> {
        let session = self.session.lock().await;
        session
            .access_token
            .clone()
            .map(|token| (token, session.generation))
    }

    pub async fn store(&self, tokens: TokenPair) {
        let mut session = self.session.lock().await;
        if tokens.access_token.is_some() {
            session.access_token = tokens.access_token;
            session.generation += 1;
        }
        if tokens.refresh_token.is_some() {
            session.refresh_token = tokens.refresh_token;
        }
    }

    pub async fn clear(&self) {
        let mut session = self.session.lock().await;
        session.access_token = None;
        session.refresh_token = None;
        session.generation += 1;
    }

    /// Exchange the refresh token for a new access token, single-flight.
    ///
    /// `observed_generation` is the generation of the token the caller just
    /// got a 401 with. If another waiter already refreshed past it, the
    /// current token is returned without another network call.
    pub async fn refresh(
        &self,
        http: &reqwest::Client,
        config: &ClientConfig,
        observed_generation: u64,
    ) -> Result<String> {
        let mut session = self.session.lock().await;

        if session.generation != observed_generation {
            if let Some(token) = session.access_token.clone() {
                return Ok(token);
            }
        }

        let refresh_token = session.refresh_token.clone().ok_or_else(|| {
            Error::Unauthorized("session expired, sign in again".to_string())
        })?;

        let response = http
            .post(config.endpoint("/authenticator/landlord/refreshtoken"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // A rejected refresh token ends the session for every waiter.
            session.access_token = None;
            session.refresh_token = None;
            session.generation += 1;
            tracing::warn!(status = %status, "Token refresh rejected");
            return Err(Error::Unauthorized(
                "session expired, sign in again".to_string(),
            ));
        }

        let tokens: TokenPair = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("refresh token response: {e}")))?;

        let access_token = tokens.access_token.ok_or_else(|| {
            Error::Decode("refresh token response missing accessToken".to_string())
        })?;

        session.access_token = Some(access_token.clone());
        if tokens.refresh_token.is_some() {
            session.refresh_token = tokens.refresh_token;
        }
        session.generation += 1;
        tracing::debug!(generation = session.generation, "Access token refreshed");

        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_bumps_generation_only_with_access_token() {
        let auth = AuthManager::default();
        assert!(auth.access_token().await.is_none());

        auth.store(TokenPair {
            access_token: Some("a1".to_string()),
            refresh_token: Some("r1".to_string()),
        })
        .await;
        let (token, generation) = auth.access_token().await.unwrap();
        assert_eq!(token, "a1");
        assert_eq!(generation, 1);

        // A refresh-token-only update must not invalidate waiters' view.
        auth.store(TokenPair {
            access_token: None,
            refresh_token: Some("r2".to_string()),
        })
        .await;
        let (_, generation) = auth.access_token().await.unwrap();
        assert_eq!(generation, 1);
    }

    #[tokio::test]
    async fn late_waiter_reuses_refreshed_token() {
        let auth = AuthManager::default();
        auth.store(TokenPair {
            access_token: Some("a1".to_string()),
            refresh_token: Some("r1".to_string()),
        })
        .await;
        let (_, stale_generation) = auth.access_token().await.unwrap();

        // Simulate another waiter having refreshed in the meantime.
        auth.store(TokenPair {
            access_token: Some("a2".to_string()),
            refresh_token: None,
        })
        .await;

        let http = reqwest::Client::new();
        let config = ClientConfig::default();
        let token = auth.refresh(&http, &config, stale_generation).await.unwrap();
        assert_eq!(token, "a2");
    }

    #[tokio::test]
    async fn refresh_without_session_is_unauthorized() {
        let auth = AuthManager::default();
        let http = reqwest::Client::new();
        let config = ClientConfig::default();
        let result = auth.refresh(&http, &config, 0).await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }
}
