//! Outbound request gate.
//!
//! Every authenticated REST call passes through [`RequestGate::send`], which
//! attaches a valid bearer credential, refreshing it first when the access
//! credential has expired. A failed refresh ends the session and the call is
//! never dispatched with a stale credential.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use universe_types::error::GateError;
use universe_types::session::LogoutReason;

use crate::now_ms;
use crate::session::SessionManager;
use crate::session::manager::REFRESH_PATH;
use crate::session::token::decode_claims;
use crate::storage::KvStore;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

/// Source of a currently valid access credential.
///
/// The chat channel asks for one on every (re)connect handshake.
pub trait AccessTokenSource: Send + Sync {
    /// `Ok(None)` when there is no session.
    fn access_token(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<SecretString>, GateError>> + Send;
}

/// Wraps the transport with credential attachment and refresh.
pub struct RequestGate<T, S> {
    session: Arc<SessionManager<T, S>>,
}

impl<T, S> Clone for RequestGate<T, S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<T: HttpTransport, S: KvStore> RequestGate<T, S> {
    pub fn new(session: Arc<SessionManager<T, S>>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionManager<T, S>> {
        &self.session
    }

    /// Dispatch `request`, attaching a valid bearer credential when there is
    /// a session.
    ///
    /// Non-2xx responses become [`GateError::Api`], except 401 to a bearer
    /// call, which ends the session as revoked.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, GateError> {
        if request.authenticated && request.path != REFRESH_PATH {
            request.bearer = self.authorize().await?;
        }
        let had_bearer = request.bearer.is_some();
        let method = request.method;
        let path = request.path.clone();

        let response = self.session.transport().send(request).await?;
        debug!(%method, %path, status = response.status, "backend call");

        if response.status == 401 && had_bearer {
            warn!(%method, %path, "bearer credential rejected, ending session");
            self.session.invalidate(LogoutReason::Revoked).await;
            return Err(GateError::Unauthorized);
        }
        if !response.is_success() {
            return Err(GateError::Api {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    /// A valid access credential for the current session, refreshing first
    /// if needed. `None` when logged out.
    async fn authorize(&self) -> Result<Option<SecretString>, GateError> {
        let Some(credentials) = self.session.credentials().await else {
            return Ok(None);
        };

        let expired = match decode_claims(credentials.access().expose_secret()) {
            Ok(claims) => claims.is_expired_at(now_ms()),
            Err(e) => {
                warn!(error = %e, "access credential undecodable, refreshing");
                true
            }
        };
        if !expired {
            return Ok(Some(credentials.access().clone()));
        }

        debug!("access credential expired, refreshing before dispatch");
        let fresh = self.session.refresh_credentials(&credentials).await?;
        Ok(Some(fresh.access().clone()))
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: impl Into<String>) -> Result<R, GateError> {
        decode(self.send(ApiRequest::get(path)).await?)
    }

    pub async fn get_json_with_query<R: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        query: &[(&str, &str)],
    ) -> Result<R, GateError> {
        let request = query
            .iter()
            .fold(ApiRequest::get(path), |request, (k, v)| request.query(*k, *v));
        decode(self.send(request).await?)
    }

    pub async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<R, GateError> {
        decode(self.send(ApiRequest::post(path).json(encode(body)?)).await?)
    }

    pub async fn put_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<R, GateError> {
        decode(self.send(ApiRequest::put(path).json(encode(body)?)).await?)
    }

    pub async fn patch_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<R, GateError> {
        decode(self.send(ApiRequest::patch(path).json(encode(body)?)).await?)
    }

    /// POST whose response body is not needed (toggles, mark-read).
    pub async fn post(&self, path: impl Into<String>, body: serde_json::Value) -> Result<ApiResponse, GateError> {
        self.send(ApiRequest::post(path).json(body)).await
    }

    pub async fn delete(&self, path: impl Into<String>) -> Result<(), GateError> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }
}

impl<T: HttpTransport, S: KvStore> AccessTokenSource for RequestGate<T, S> {
    async fn access_token(&self) -> Result<Option<SecretString>, GateError> {
        self.authorize().await
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, GateError> {
    serde_json::to_value(body).map_err(|e| GateError::Serialization(e.to_string()))
}

fn decode<R: DeserializeOwned>(response: ApiResponse) -> Result<R, GateError> {
    response
        .json()
        .map_err(|e| GateError::Serialization(e.to_string()))
}
