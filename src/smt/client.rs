// =============================================================================
// SMT Game Server REST Client
// =============================================================================
//
// Every call is a GET against a single PHP endpoint, scoped to one game
// account by `accountid` + `sess` query parameters and dispatched by `f`.
//
// SECURITY: The session id grants access to the player's account. It is never
// logged and is redacted from `Debug` output.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::model::{ShareDetail, ShareMarket};

/// Request timeout for every game-server call.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Longest slice of an error body quoted in an error message.
const MAX_ERROR_BODY: usize = 256;

// =============================================================================
// Credentials
// =============================================================================

/// Game account the client acts for.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SmtCredentials {
    pub account_id: String,
    pub session_id: String,
}

impl SmtCredentials {
    pub fn new(account_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Read `SMT_ACCOUNT_ID` / `SMT_SESSION_ID`; missing values are empty.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("SMT_ACCOUNT_ID").unwrap_or_default(),
            std::env::var("SMT_SESSION_ID").unwrap_or_default(),
        )
    }

    pub fn is_complete(&self) -> bool {
        !self.account_id.is_empty() && !self.session_id.is_empty()
    }
}

impl std::fmt::Debug for SmtCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtCredentials")
            .field("account_id", &self.account_id)
            .field("session_id", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Client
// =============================================================================

/// Read-only client for the SMT game server.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct SmtClient {
    base_url: String,
    credentials: SmtCredentials,
    client: reqwest::Client,
}

impl SmtClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `SmtClient` bound to `credentials`.
    pub fn new(base_url: impl Into<String>, credentials: SmtCredentials) -> Result<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url).with_context(|| format!("invalid SMT base url '{base_url}'"))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, account_id = %credentials.account_id, "SmtClient initialised");

        Ok(Self {
            base_url,
            credentials,
            client,
        })
    }

    /// A client for another account sharing this client's connection pool.
    pub fn with_credentials(&self, credentials: SmtCredentials) -> Self {
        Self {
            base_url: self.base_url.clone(),
            credentials,
            client: self.client.clone(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.credentials.account_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// `f=getsharemarket`: every listed share.
    #[instrument(skip(self), name = "smt::share_market")]
    pub async fn share_market(&self) -> Result<ShareMarket> {
        let market: ShareMarket = self.fetch("getsharemarket", &[]).await?;
        debug!(shares = market.sharemarket.len(), "share market fetched");
        Ok(market)
    }

    /// `f=getsharedetail&s=SYMBOL`: quote, order summary and histories.
    #[instrument(skip(self), name = "smt::share_detail")]
    pub async fn share_detail(&self, symbol: &str) -> Result<ShareDetail> {
        let detail: ShareDetail = self.fetch("getsharedetail", &[("s", symbol)]).await?;
        debug!(
            symbol,
            history_1m = detail.sharehistory1.len(),
            history_60m = detail.sharehistory60.len(),
            "share detail fetched"
        );
        Ok(detail)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Full request URL for game function `function` with `extra` parameters.
    fn request_url(&self, function: &str, extra: &[(&str, &str)]) -> Result<Url> {
        let mut params: Vec<(&str, &str)> = vec![
            ("accountid", self.credentials.account_id.as_str()),
            ("sess", self.credentials.session_id.as_str()),
            ("f", function),
        ];
        params.extend_from_slice(extra);

        Url::parse_with_params(&self.base_url, &params)
            .with_context(|| format!("failed to build SMT url for f={function}"))
    }

    async fn fetch<T: DeserializeOwned>(&self, function: &str, extra: &[(&str, &str)]) -> Result<T> {
        let url = self.request_url(function, extra)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("SMT f={function} request failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read SMT f={function} response"))?;

        if !status.is_success() {
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            anyhow::bail!("SMT f={function} returned {status}: {snippet}");
        }

        serde_json::from_str(&body).with_context(|| format!("failed to parse SMT f={function} response"))
    }
}

impl std::fmt::Debug for SmtClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SmtClient {
        SmtClient::new(
            "https://smt.example.test/unity.php",
            SmtCredentials::new("9158", "secret-session"),
        )
        .unwrap()
    }

    #[test]
    fn request_url_carries_account_scope() {
        let url = client().request_url("getsharedetail", &[("s", "APX")]).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("accountid".to_string(), "9158".to_string()),
                ("sess".to_string(), "secret-session".to_string()),
                ("f".to_string(), "getsharedetail".to_string()),
                ("s".to_string(), "APX".to_string()),
            ]
        );
        assert_eq!(url.path(), "/unity.php");
    }

    #[test]
    fn symbols_are_query_encoded() {
        let url = client().request_url("getsharedetail", &[("s", "A&B")]).unwrap();
        assert!(url.as_str().ends_with("s=A%26B"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(SmtClient::new("not a url", SmtCredentials::default()).is_err());
    }

    #[test]
    fn with_credentials_swaps_account() {
        let other = client().with_credentials(SmtCredentials::new("42", "s2"));
        assert_eq!(other.account_id(), "42");
        assert_eq!(other.base_url(), "https://smt.example.test/unity.php");
    }

    #[test]
    fn debug_never_prints_session() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("secret-session"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn credentials_completeness() {
        assert!(!SmtCredentials::default().is_complete());
        assert!(SmtCredentials::new("1", "2").is_complete());
    }
}
