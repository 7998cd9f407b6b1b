use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;

use crate::api::types::*;
use crate::api::WalletBackend;
use crate::config::ApiConfig;
use crate::error::WalletError;
use crate::idempotency::IdempotencyKey;

const REFRESH_TOKEN_PATH: &str = "/v1/auth/refresh-token";

#[derive(Debug, Clone, Default)]
struct SessionTokens {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// One outgoing call, built up before it is sent (and possibly re-sent after a token refresh)
struct ApiRequest<'a> {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    idempotency_key: Option<&'a IdempotencyKey>,
}

impl<'a> ApiRequest<'a> {
    fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            idempotency_key: None,
        }
    }

    fn post<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, WalletError> {
        let body = serde_json::to_value(body)
            .map_err(|e| WalletError::Transport(format!("Failed to encode request: {}", e)))?;
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            idempotency_key: None,
        })
    }

    fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    fn idempotent(mut self, key: &'a IdempotencyKey) -> Self {
        self.idempotency_key = Some(key);
        self
    }
}

/// REST implementation of [`WalletBackend`]
pub struct HttpBackend {
    http: HttpClient,
    config: ApiConfig,
    tokens: RwLock<SessionTokens>,
}

impl HttpBackend {
    pub fn new(config: ApiConfig) -> Result<Self, WalletError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config,
            tokens: RwLock::new(SessionTokens::default()),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Install the tokens obtained at login
    pub fn set_tokens(&self, access_token: impl Into<String>, refresh_token: Option<String>) {
        let mut tokens = match self.tokens.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tokens.access_token = Some(access_token.into());
        tokens.refresh_token = refresh_token;
    }

    pub fn clear_tokens(&self) {
        let mut tokens = match self.tokens.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *tokens = SessionTokens::default();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().access_token.is_some()
    }

    fn session(&self) -> SessionTokens {
        match self.tokens.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn call(&self, request: ApiRequest<'_>) -> Result<Value, WalletError> {
        let token = self.session().access_token;
        let (status, body) = self.send_once(&request, token.as_deref()).await?;

        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            log::warn!("Access token rejected for {}, attempting refresh", request.path);
            let fresh = match self.refresh_session().await {
                Ok(fresh) => fresh,
                Err(e) => {
                    log::error!("Token refresh failed, clearing session: {}", e);
                    self.clear_tokens();
                    return Err(WalletError::Unauthorized);
                }
            };
            let (status, body) = self.send_once(&request, Some(&fresh)).await?;
            return interpret(status, body);
        }

        interpret(status, body)
    }

    async fn send_once(
        &self,
        request: &ApiRequest<'_>,
        token: Option<&str>,
    ) -> Result<(StatusCode, Value), WalletError> {
        let url = self.config.endpoint(&request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(key) = request.idempotency_key {
            builder = builder.header("Idempotency-Key", key.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        log::debug!("{} {}", request.method, url);
        let response = builder.send().await.map_err(|e| {
            log::error!("Request to {} failed: {}", url, e);
            WalletError::from(e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Body is irrelevant; the caller decides whether to refresh
            return Ok((status, Value::Null));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let text = response.text().await?;

        if !is_json {
            log::error!("Non-JSON response from {} ({}): {:.200}", url, status, text);
            if text.contains("<!DOCTYPE") || text.contains("<html") {
                return Err(WalletError::Transport(format!(
                    "Server returned HTML instead of JSON. API endpoint may be unavailable (status {})",
                    status.as_u16()
                )));
            }
            return Err(WalletError::Transport(format!(
                "Server returned non-JSON response ({})",
                status.as_u16()
            )));
        }

        let body = serde_json::from_str::<Value>(&text).map_err(|e| {
            WalletError::Transport(format!("Invalid JSON response ({}): {}", status.as_u16(), e))
        })?;
        Ok((status, body))
    }

    /// Exchange the refresh token for a new access token
    async fn refresh_session(&self) -> Result<String, WalletError> {
        let refresh_token = self
            .session()
            .refresh_token
            .ok_or_else(|| WalletError::Transport("No refresh token available".to_string()))?;

        let request = ApiRequest::post(
            REFRESH_TOKEN_PATH,
            &RefreshTokenRequest {
                refresh_token: &refresh_token,
            },
        )?;
        let (status, body) = self.send_once(&request, None).await?;
        let body = interpret(status, body)?;

        let parsed: RefreshTokenResponse = serde_json::from_value(unwrap_data(body, "data"))
            .map_err(|e| WalletError::Transport(format!("Invalid refresh response: {}", e)))?;
        let access_token = parsed
            .access_token
            .or(parsed.token)
            .ok_or_else(|| WalletError::Transport("Refresh response carried no token".to_string()))?;

        let rotated = parsed.refresh_token.or(Some(refresh_token));
        self.set_tokens(access_token.clone(), rotated);
        log::info!("Access token refreshed");
        Ok(access_token)
    }
}

/// Map a status/body pair to the body or the error the caller should see
fn interpret(status: StatusCode, body: Value) -> Result<Value, WalletError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(WalletError::Unauthorized);
    }
    if !status.is_success() {
        return Err(match message_of(&body) {
            Some(message) => WalletError::Rejected(message),
            None => WalletError::Transport(format!("HTTP error! status: {}", status.as_u16())),
        });
    }
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(WalletError::Rejected(
            message_of(&body).unwrap_or_else(|| "Request failed".to_string()),
        ));
    }
    Ok(body)
}

fn message_of(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|field| {
        body.get(*field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// `data` when the backend wraps its payload, the body itself otherwise
fn unwrap_data(body: Value, wrapper: &str) -> Value {
    match body.get(wrapper) {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => body,
    }
}

fn data_array(body: &Value) -> Vec<Value> {
    body.get("data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[async_trait]
impl WalletBackend for HttpBackend {
    async fn crypto_balances(&self, user_id: &str) -> Result<Vec<RawBalance>, WalletError> {
        let body = self
            .call(ApiRequest::get(format!("/v1/wallet/balances/{}", user_id)))
            .await?;
        let rows = data_array(&body);
        serde_json::from_value(Value::Array(rows))
            .map_err(|e| WalletError::Transport(format!("Failed to parse balances: {}", e)))
    }

    async fn fiat_balance(&self, user_id: &str, currency_code: &str) -> Result<f64, WalletError> {
        let body = self
            .call(ApiRequest::get(format!(
                "/v1/wallet/balance/{}/{}",
                user_id, currency_code
            )))
            .await?;
        Ok(body
            .get("data")
            .and_then(|data| data.get("balance"))
            .and_then(flex_value)
            .unwrap_or(0.0))
    }

    async fn transaction_history(&self, user_id: &str) -> Result<Vec<Value>, WalletError> {
        let body = self
            .call(ApiRequest::get("/v1/wallet/history").query("userId", user_id))
            .await?;
        Ok(data_array(&body))
    }

    async fn unit_price(&self, currency_id: &str) -> Result<f64, WalletError> {
        let id = currency_id.to_lowercase();
        let body = self
            .call(ApiRequest::get(format!("/v1/wallet/rates/{}", id)))
            .await?;
        body.get(&id)
            .and_then(flex_value)
            .filter(|price| *price > 0.0)
            .ok_or_else(|| WalletError::Transport(format!("Invalid rate for {}", id)))
    }

    async fn convert_quote(&self, request: &ConvertQuoteRequest) -> Result<ConvertQuotePayload, WalletError> {
        let body = self
            .call(ApiRequest::post("/v1/wallet/crypto/convert/quote", request)?)
            .await?;
        serde_json::from_value(unwrap_data(body, "data"))
            .map_err(|e| WalletError::Transport(format!("Invalid quote response: {}", e)))
    }

    async fn swap_quote(&self, request: &SwapQuoteRequest) -> Result<SwapQuotePayload, WalletError> {
        let body = self
            .call(ApiRequest::post("/v1/wallet/swap/quote", request)?)
            .await?;
        let payload = match body.get("quote") {
            Some(quote) if quote.is_object() => quote.clone(),
            _ => unwrap_data(body, "data"),
        };
        serde_json::from_value(payload)
            .map_err(|e| WalletError::Transport(format!("Invalid quote response: {}", e)))
    }

    async fn execute_convert(
        &self,
        request: &ConvertExecuteRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError> {
        let body = self
            .call(ApiRequest::post("/v1/wallet/crypto/convert/execute", request)?.idempotent(key))
            .await?;
        Ok(TransferAck::from_body(body))
    }

    async fn execute_swap(
        &self,
        request: &SwapExecuteRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError> {
        let body = self
            .call(ApiRequest::post("/v1/wallet/swap/execute", request)?.idempotent(key))
            .await?;
        Ok(TransferAck::from_body(body))
    }

    async fn withdraw(
        &self,
        request: &WithdrawRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError> {
        let body = self
            .call(ApiRequest::post("/v1/vault/withdraw", request)?.idempotent(key))
            .await?;
        Ok(TransferAck::from_body(body))
    }

    async fn resolve_bank_account(&self, request: &BankResolveRequest) -> Result<Value, WalletError> {
        self.call(ApiRequest::post("/v1/wallet/payout/ngn/resolve", request)?)
            .await
    }
}
