//! HTTP adapter for the libris API.

use std::sync::Arc;
use std::time::Duration;

use libris_model::{AccessToken, Credentials, Draft, ListQuery, ListResult};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::navigator::{Navigator, RouteNavigator};
use crate::resource::Resource;
use crate::session::Session;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// Login endpoint. The only request sent without a bearer token.
pub const LOGIN_PATH: &str = "/v1/auth/login";

/// Typed client for the libris API.
///
/// Cheap to clone; clones share the transport, session and navigator.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Session,
    navigator: Arc<dyn Navigator>,
    timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client over HTTP, using `config` for the base URL and timeout.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            session,
            config.timeout,
        ))
    }

    /// Client over any [`Transport`].
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        session: Session,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            session,
            navigator: Arc::new(RouteNavigator::default()),
            timeout,
        }
    }

    /// Replace the navigator consulted by the 401 handler.
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request through the full pipeline.
    ///
    /// Attaches the bearer token, applies the timeout and the optional
    /// cancellation token, runs the 401 handler and turns every non-2xx
    /// status into a [`ClientError`].
    pub async fn execute(
        &self,
        mut request: ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<ApiResponse> {
        let (token, generation) = self.session.token_with_generation();
        if request.authorized {
            request.bearer = token;
        }
        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(%method, %path, "sending request");

        let send = tokio::time::timeout(self.timeout, self.transport.send(request));
        let outcome = match cancel {
            Some(cancel) => tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(%method, %path, "request cancelled");
                    return Err(ClientError::Cancelled);
                }
                outcome = send => outcome,
            },
            None => send.await,
        };
        let response = outcome.map_err(|_| {
            tracing::warn!(%method, %path, timeout = ?self.timeout, "request timed out");
            ClientError::Timeout(self.timeout)
        })??;

        tracing::debug!(%method, %path, status = response.status, "received response");

        if response.status == 401 && !self.navigator.on_login_route() {
            tracing::warn!(%method, %path, "session expired, redirecting to login");
            if let Err(e) = self.session.expire(generation) {
                tracing::warn!(error = %e, "failed to clear stored token");
            }
            self.navigator.redirect_to_login();
            return Err(ClientError::SessionExpired);
        }

        if !response.is_success() {
            return Err(ClientError::from_response(response.status, &response.body));
        }
        Ok(response)
    }

    /// `POST /v1/auth/login`. Does not touch the session.
    pub async fn login(
        &self,
        credentials: &Credentials,
        cancel: Option<&CancellationToken>,
    ) -> Result<AccessToken> {
        let request = ApiRequest::post(LOGIN_PATH)
            .with_body(serde_json::to_value(credentials)?)
            .anonymous();
        let response = self.execute(request, cancel).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Fetch one list page.
    pub async fn list<R: Resource>(
        &self,
        query: &ListQuery,
        cancel: Option<&CancellationToken>,
    ) -> Result<ListResult<R>> {
        let response = self.execute(R::list_request(query), cancel).await?;
        R::decode_list(&response.body, query)
    }

    /// Fetch a single record.
    pub async fn get<R: Resource>(
        &self,
        id: libris_model::EntityId,
        cancel: Option<&CancellationToken>,
    ) -> Result<R> {
        let response = self.execute(ApiRequest::get(R::item_path(id)), cancel).await?;
        R::decode_one(&response.body)
    }

    pub async fn create<R: Resource>(
        &self,
        draft: &R::Draft,
        cancel: Option<&CancellationToken>,
    ) -> Result<R> {
        let request = ApiRequest::post(R::path()).with_body(serde_json::to_value(draft)?);
        let response = self.execute(request, cancel).await?;
        R::decode_saved(&response.body)
    }

    /// `PUT` the draft; it must carry the id of the record being edited.
    pub async fn update<R: Resource>(
        &self,
        draft: &R::Draft,
        cancel: Option<&CancellationToken>,
    ) -> Result<R> {
        if draft.id().is_none() {
            return Err(ClientError::MissingId(R::KIND));
        }
        let request = ApiRequest::put(R::path()).with_body(serde_json::to_value(draft)?);
        let response = self.execute(request, cancel).await?;
        R::decode_saved(&response.body)
    }

    /// Delete `entity` and hand it back on success.
    pub async fn delete<R: Resource>(
        &self,
        entity: &R,
        cancel: Option<&CancellationToken>,
    ) -> Result<R> {
        let id = entity.id().ok_or(ClientError::MissingId(R::KIND))?;
        self.execute(ApiRequest::delete(R::item_path(id)), cancel)
            .await?;
        Ok(entity.clone())
    }
}
