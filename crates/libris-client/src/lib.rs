//! Client side of the libris REST API.
//!
//! # Overview
//!
//! - [`ApiClient`] is the HTTP adapter: it prefixes the base URL, attaches the
//!   bearer token, enforces the request timeout and cancellation, classifies
//!   error bodies, and runs the global 401 handler.
//! - [`Session`] holds the current access token for the whole process and
//!   decodes its claims locally.
//! - [`Resource`] pins down the wire contract of each entity (paths, list
//!   envelopes, create/update response shapes).
//! - [`Transport`] is the seam between the adapter and the network;
//!   [`HttpTransport`] is the `reqwest` implementation.
//!
//! # Example
//!
//! ```no_run
//! use libris_client::{ApiClient, ClientConfig, Session, MemoryTokenStore};
//! use libris_model::{Book, Credentials, ListQuery};
//!
//! async fn first_page() -> libris_client::Result<()> {
//!     let config = ClientConfig::new("https://books.example.com");
//!     let session = Session::init(MemoryTokenStore::default())?;
//!     let client = ApiClient::new(&config, session.clone())?;
//!
//!     let token = client.login(&Credentials::new("me@example.com", "secret"), None).await?;
//!     session.set_token(token.access_token)?;
//!
//!     let page = client.list::<Book>(&ListQuery::first_page(12), None).await?;
//!     println!("{} of {} books", page.items.len(), page.total_items);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod navigator;
pub mod resource;
pub mod session;
pub mod transport;

pub use client::{ApiClient, LOGIN_PATH};
pub use config::{API_HOST_ENV, ClientConfig, DEFAULT_API_HOST, DEFAULT_TIMEOUT_SECS, TIMEOUT_ENV};
pub use error::{ClientError, ErrorBody, GENERIC_FAILURE_MESSAGE, Result, SessionError};
pub use navigator::{LOGIN_ROUTE, Navigator, RouteNavigator};
pub use resource::Resource;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TOKEN_KEY, TokenClaims, TokenStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, JSON_CONTENT_TYPE, Method, Transport};

/// Re-exported so callers can cancel requests without depending on tokio-util.
pub use tokio_util::sync::CancellationToken;
