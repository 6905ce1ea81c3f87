// ============================================================================
// API CLIENT - Authenticated request gateway
// ============================================================================
// Every outbound call goes through here: JSON headers, bearer injection,
// envelope decoding and the global reaction to 401. No business logic and
// no navigation.
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;

use crate::error::ClientError;
use crate::models::ApiEnvelope;
use crate::services::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::state::reactivity::EventSignal;
use crate::utils::storage::TokenStore;

const UNAUTHORIZED_FALLBACK: &str = "Unauthorized";
const INVALID_RESPONSE: &str = "Invalid response from server";

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn HttpTransport>,
    tokens: Rc<dyn TokenStore>,
    unauthorized: EventSignal,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Rc<dyn HttpTransport>,
        tokens: Rc<dyn TokenStore>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            tokens,
            unauthorized: EventSignal::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Persisted token store shared with the session store
    pub fn tokens(&self) -> Rc<dyn TokenStore> {
        self.tokens.clone()
    }

    /// Called once per rejected (401) response, after the stored token is gone
    pub fn on_unauthorized<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.unauthorized.subscribe(callback);
    }

    pub fn unauthorized_signal(&self) -> &EventSignal {
        &self.unauthorized
    }

    /// GET returning the envelope's `data` (or a bare JSON body)
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .execute(Method::Get, path, None, self.tokens.load())
            .await?;
        decode_data(&response)
    }

    /// POST a JSON body, returning the envelope's `data`
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let json = encode_body(body)?;
        let response = self
            .execute(Method::Post, path, Some(json), self.tokens.load())
            .await?;
        decode_data(&response)
    }

    /// POST a JSON body, returning the whole successful envelope (data may be absent)
    pub async fn post_envelope<B, T>(&self, path: &str, body: &B) -> Result<ApiEnvelope<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let json = encode_body(body)?;
        let response = self
            .execute(Method::Post, path, Some(json), self.tokens.load())
            .await?;
        decode_envelope(&response)
    }

    /// POST a JSON body where only success matters
    pub async fn post_json_ack<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let json = encode_body(body)?;
        let response = self
            .execute(Method::Post, path, Some(json), self.tokens.load())
            .await?;
        decode_ack(&response)
    }

    /// POST without body, returning the envelope's `data`
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .execute(Method::Post, path, None, self.tokens.load())
            .await?;
        decode_data(&response)
    }

    /// POST without body where only success matters
    pub async fn post_ack(&self, path: &str) -> Result<(), ClientError> {
        let response = self
            .execute(Method::Post, path, None, self.tokens.load())
            .await?;
        decode_ack(&response)
    }

    /// POST carrying an explicit token instead of the stored one (logout
    /// notifies the server after the local token is already gone)
    pub async fn post_ack_as(&self, path: &str, token: &str) -> Result<(), ClientError> {
        let response = self
            .execute(Method::Post, path, None, Some(token.to_string()))
            .await?;
        decode_ack(&response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        bearer: Option<String>,
    ) -> Result<HttpResponse, ClientError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = &bearer {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        log::debug!("🌐 [API] {} {}", method, path);
        let request = HttpRequest {
            method,
            url: self.url(path),
            headers,
            body,
        };

        let response = self.transport.send(request).await.map_err(|e| {
            log::warn!("📡 [API] {} {} failed: {}", method, path, e);
            ClientError::NetworkFailure(e)
        })?;

        if response.status == 401 {
            log::warn!("🔒 [API] {} {} rejected with 401", method, path);
            self.handle_unauthorized(bearer.as_deref());
            let message = reason_from_body(&response.body)
                .unwrap_or_else(|| UNAUTHORIZED_FALLBACK.to_string());
            return Err(ClientError::Unauthorized(message));
        }

        if !response.is_success() {
            log::warn!("❌ [API] {} {} -> HTTP {}", method, path, response.status);
            let message = reason_from_body(&response.body).unwrap_or_default();
            return Err(ClientError::server(response.status, message));
        }

        Ok(response)
    }

    /// Clears the stored token and raises the signal, unless the token changed
    /// while the request was in flight (a newer session must survive)
    fn handle_unauthorized(&self, sent: Option<&str>) {
        let stored = self.tokens.load();
        if stored.as_deref() != sent {
            log::info!("🔒 [API] 401 for a previous session, ignoring");
            return;
        }
        if let Err(e) = self.tokens.clear() {
            log::error!("❌ [API] Could not clear stored token: {}", e);
        }
        self.unauthorized.raise();
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<String, ClientError> {
    serde_json::to_string(body).map_err(|e| ClientError::ServerError {
        status: None,
        message: format!("Serialization error: {}", e),
    })
}

fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .map(|object| object.contains_key("success"))
        .unwrap_or(false)
}

fn reason_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ApiEnvelope<Value>>(body)
        .ok()
        .and_then(|envelope| envelope.reason().map(str::to_string))
}

fn invalid_response(status: u16, detail: impl std::fmt::Display) -> ClientError {
    log::error!("❌ [API] Could not decode response: {}", detail);
    ClientError::server(status, INVALID_RESPONSE)
}

/// Successful envelope; a bare JSON body is treated as its `data`
fn decode_envelope<T: DeserializeOwned>(response: &HttpResponse) -> Result<ApiEnvelope<T>, ClientError> {
    let value: Value =
        serde_json::from_str(&response.body).map_err(|e| invalid_response(response.status, e))?;

    if !is_envelope(&value) {
        let data = serde_json::from_value(value).map_err(|e| invalid_response(response.status, e))?;
        return Ok(ApiEnvelope {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        });
    }

    let envelope: ApiEnvelope<T> =
        serde_json::from_value(value).map_err(|e| invalid_response(response.status, e))?;
    if !envelope.success {
        let message = envelope.reason().unwrap_or("Request failed").to_string();
        return Err(ClientError::server(response.status, message));
    }
    Ok(envelope)
}

fn decode_data<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ClientError> {
    decode_envelope(response)?
        .into_data()
        .map_err(|message| ClientError::server(response.status, message))
}

fn decode_ack(response: &HttpResponse) -> Result<(), ClientError> {
    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) if value.get("success").and_then(Value::as_bool) == Some(false) => {
            let message =
                reason_from_body(&response.body).unwrap_or_else(|| "Request failed".to_string());
            Err(ClientError::server(response.status, message))
        }
        _ => Ok(()),
    }
}
