//! HTTP client core for the portal web API.
//!
//! # Overview
//! `create_client` resolves a `ClientConfig` from the runtime `Environment`
//! and wires the standard interceptor pipeline: bearer credentials from a
//! `TokenStore` on the way out, CORS/network classification of transport
//! failures on the way back. Requests are plain data; a `Transport` performs
//! the round-trip (host-does-IO pattern).
//!
//! # Design
//! - Configuration is computed once per client and never changes.
//! - The access token is looked up on every request, never cached.
//! - Credential problems degrade to an unauthenticated request; transport
//!   failures are always surfaced, never retried.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod token;
pub mod transport;
pub mod types;

pub use client::{create_client, ApiClient};
pub use config::{ClientConfig, Environment, RuntimeMode};
pub use error::{ApiError, TokenStoreError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{
    AuthInterceptor, NetworkErrorClassifier, RequestInterceptor, ResponseInterceptor,
};
pub use token::{MemoryTokenStore, NoToken, TokenStore};
pub use transport::Transport;
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
pub use types::PasswordResetRequest;
