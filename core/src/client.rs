//! The portal API client and its factory.
//!
//! # Design
//! `ApiClient` holds a `ClientConfig` that is fixed at construction and two
//! ordered interceptor lists. It builds `HttpRequest` values and interprets
//! transport outcomes; a `Transport` performs the round-trip in between.
//! Each endpoint follows the same `build_*` / `parse_*` split, with a
//! convenience method that runs both around a transport.

use std::fmt;
use std::sync::Arc;

use crate::config::{ClientConfig, Environment};
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::interceptor::{
    AuthInterceptor, NetworkErrorClassifier, RequestInterceptor, ResponseInterceptor,
};
use crate::token::TokenStore;
use crate::transport::Transport;
use crate::types::PasswordResetRequest;

const PASSWORD_RESET_REQUEST_PATH: &str = "/user/auth/reset-password/request/email";

/// Build the standard client: configuration resolved from `env`, bearer
/// credentials from `tokens`, and transport failures classified.
pub fn create_client(env: &Environment, tokens: Arc<dyn TokenStore>) -> ApiClient {
    ApiClient::new(ClientConfig::resolve(env))
        .with_request_interceptor(AuthInterceptor::new(tokens))
        .with_response_interceptor(NetworkErrorClassifier)
}

#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    request_stages: Vec<Arc<dyn RequestInterceptor>>,
    response_stages: Vec<Arc<dyn ResponseInterceptor>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("request_stages", &self.request_stages.len())
            .field("response_stages", &self.response_stages.len())
            .finish()
    }
}

impl ApiClient {
    /// A client with no interceptors.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
            request_stages: Vec::new(),
            response_stages: Vec::new(),
        }
    }

    pub fn with_request_interceptor(mut self, stage: impl RequestInterceptor + 'static) -> Self {
        self.request_stages.push(Arc::new(stage));
        self
    }

    pub fn with_response_interceptor(mut self, stage: impl ResponseInterceptor + 'static) -> Self {
        self.response_stages.push(Arc::new(stage));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request for `path` and run it through the request stages.
    pub fn prepare(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let request = HttpRequest {
            method,
            url: self.config.url_for(path),
            headers: self.config.default_headers.clone(),
            body,
            timeout: self.config.timeout,
            with_credentials: self.config.with_credentials,
        };
        tracing::debug!(method = method.as_str(), url = %request.url, "preparing request");
        self.request_stages
            .iter()
            .fold(request, |req, stage| stage.on_request(req))
    }

    /// Run the response stages over a transport outcome.
    ///
    /// A stage may rewrite the error, but an `Err` always stays an `Err`.
    pub fn complete(
        &self,
        result: Result<HttpResponse, TransportError>,
    ) -> Result<HttpResponse, TransportError> {
        match result {
            Ok(response) => Ok(self
                .response_stages
                .iter()
                .fold(response, |resp, stage| stage.on_response(resp))),
            Err(error) => Err(self
                .response_stages
                .iter()
                .fold(error, |err, stage| stage.on_error(err))),
        }
    }

    /// Execute `request` and run the response stages over the outcome.
    pub fn send<T: Transport>(
        &self,
        transport: &T,
        request: &HttpRequest,
    ) -> Result<HttpResponse, ApiError> {
        Ok(self.complete(transport.execute(request))?)
    }

    // -- password reset ----------------------------------------------------

    pub fn build_request_password_reset(&self, email: &str) -> Result<HttpRequest, ApiError> {
        let payload = PasswordResetRequest {
            email: email.to_string(),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.prepare(HttpMethod::Post, PASSWORD_RESET_REQUEST_PATH, Some(body)))
    }

    /// Any 2xx is success; the body is not inspected.
    pub fn parse_request_password_reset(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(response)
    }

    /// Ask the backend to email a password-reset link to `email`.
    pub fn request_password_reset<T: Transport>(
        &self,
        transport: &T,
        email: &str,
    ) -> Result<(), ApiError> {
        let request = self.build_request_password_reset(email)?;
        let response = self.send(transport, &request)?;
        self.parse_request_password_reset(response)
    }
}

fn check_success(response: HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body,
    })
}
