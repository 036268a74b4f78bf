//! Request and response stages applied around every call.
//!
//! # Design
//! `ApiClient` keeps two ordered lists of stages. Request stages take the
//! outbound `HttpRequest` by value and return the (possibly edited) request;
//! they cannot fail. Response stages see the transport outcome and may
//! rewrite it, but `ApiClient` never lets a failed round-trip become a
//! success.

use std::sync::Arc;

use crate::error::{TransportError, ERR_NETWORK};
use crate::http::{HttpRequest, HttpResponse};
use crate::token::TokenStore;

/// Longest `Authorization` value the client will send, in UTF-16 code units.
/// Larger tokens are dropped so intermediaries never reject the request for
/// header size.
pub const MAX_AUTHORIZATION_LEN: usize = 8000;

pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, request: HttpRequest) -> HttpRequest;
}

pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, response: HttpResponse) -> HttpResponse {
        response
    }

    fn on_error(&self, error: TransportError) -> TransportError {
        error
    }
}

/// Attaches `Authorization: Bearer <token>` from a `TokenStore`.
pub struct AuthInterceptor {
    store: Arc<dyn TokenStore>,
}

impl AuthInterceptor {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for AuthInterceptor {
    fn on_request(&self, mut request: HttpRequest) -> HttpRequest {
        let token = match self.store.access_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token lookup failed, sending unauthenticated");
                None
            }
        };

        let Some(token) = token else {
            return request;
        };

        let value = format!("Bearer {token}");
        let len = value.encode_utf16().count();
        if len > MAX_AUTHORIZATION_LEN {
            tracing::debug!(len, "authorization value too long, omitting header");
            return request;
        }
        if !is_valid_header_value(&value) {
            tracing::debug!("authorization value has control characters, omitting header");
            return request;
        }
        request.set_header("Authorization", value);
        request
    }
}

/// Tab and bytes from 0x20 upwards, except DEL.
fn is_valid_header_value(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (b >= 0x20 && b != 0x7f))
}

/// Flags transport failures caused by CORS or lost connectivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkErrorClassifier;

impl ResponseInterceptor for NetworkErrorClassifier {
    fn on_error(&self, mut error: TransportError) -> TransportError {
        error.cors_or_network = is_cors_or_network_error(&error.message, error.code.as_deref());
        if error.cors_or_network {
            tracing::warn!(
                message = %error.message,
                code = ?error.code,
                "request failed with CORS or network error"
            );
        }
        error
    }
}

/// `message` mentions `CORS` (case-sensitive) or `code` is `ERR_NETWORK`.
pub fn is_cors_or_network_error(message: &str, code: Option<&str>) -> bool {
    message.contains("CORS") || code == Some(ERR_NETWORK)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::TokenStoreError;
    use crate::http::HttpMethod;
    use crate::token::{MemoryTokenStore, NoToken};

    struct BrokenStore;

    impl TokenStore for BrokenStore {
        fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
            Err(TokenStoreError("storage disabled".to_string()))
        }
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "/api/user/me".to_string(),
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_secs(10),
            with_credentials: false,
        }
    }

    fn auth(token: Option<&str>) -> AuthInterceptor {
        AuthInterceptor::new(Arc::new(token.map(str::to_string)))
    }

    #[test]
    fn attaches_bearer_token() {
        let req = auth(Some("abc.def.ghi")).on_request(request());
        assert_eq!(req.header("Authorization"), Some("Bearer abc.def.ghi"));
    }

    #[test]
    fn no_token_leaves_request_alone() {
        let req = AuthInterceptor::new(Arc::new(NoToken)).on_request(request());
        assert_eq!(req, request());
    }

    #[test]
    fn token_at_limit_is_sent() {
        let token = "a".repeat(MAX_AUTHORIZATION_LEN - "Bearer ".len());
        let req = auth(Some(token.as_str())).on_request(request());
        assert_eq!(
            req.header("Authorization").map(str::len),
            Some(MAX_AUTHORIZATION_LEN)
        );
    }

    #[test]
    fn token_over_limit_is_dropped() {
        let token = "a".repeat(MAX_AUTHORIZATION_LEN - "Bearer ".len() + 1);
        let req = auth(Some(token.as_str())).on_request(request());
        assert_eq!(req.header("Authorization"), None);
    }

    #[test]
    fn limit_counts_code_units_not_bytes() {
        // 2 bytes per char: over the limit in bytes, one UTF-16 unit each.
        let token = "é".repeat(MAX_AUTHORIZATION_LEN - "Bearer ".len());
        let req = auth(Some(token.as_str())).on_request(request());
        assert!(req.header("Authorization").is_some());
    }

    #[test]
    fn limit_counts_surrogate_pairs_twice() {
        // 3997 chars but 7994 UTF-16 units, so the value is 8001 units long.
        let token = "\u{1F600}".repeat(3997);
        let req = auth(Some(token.as_str())).on_request(request());
        assert_eq!(req.header("Authorization"), None);

        let token = "\u{1F600}".repeat(3996);
        let req = auth(Some(token.as_str())).on_request(request());
        assert!(req.header("Authorization").is_some());
    }

    #[test]
    fn token_with_line_break_is_dropped() {
        let req = auth(Some("abc\r\ndef")).on_request(request());
        assert_eq!(req.header("Authorization"), None);

        let req = auth(Some("abc\u{7f}def")).on_request(request());
        assert_eq!(req.header("Authorization"), None);
    }

    #[test]
    fn header_value_check() {
        assert!(is_valid_header_value("Bearer abc.def-ghi_jkl"));
        assert!(is_valid_header_value("Bearer a\tb"));
        assert!(!is_valid_header_value("Bearer a\nb"));
        assert!(!is_valid_header_value("Bearer a\0b"));
    }

    #[test]
    fn store_failure_degrades_to_unauthenticated() {
        let req = AuthInterceptor::new(Arc::new(BrokenStore)).on_request(request());
        assert_eq!(req.header("Authorization"), None);
    }

    #[test]
    fn token_is_read_on_every_request() {
        let store = Arc::new(MemoryTokenStore::new());
        let interceptor = AuthInterceptor::new(store.clone());

        assert_eq!(interceptor.on_request(request()).header("Authorization"), None);

        store.set("first").unwrap();
        assert_eq!(
            interceptor.on_request(request()).header("Authorization"),
            Some("Bearer first")
        );

        store.set("second").unwrap();
        assert_eq!(
            interceptor.on_request(request()).header("Authorization"),
            Some("Bearer second")
        );

        store.clear().unwrap();
        assert_eq!(interceptor.on_request(request()).header("Authorization"), None);
    }

    #[test]
    fn classification_rules() {
        assert!(is_cors_or_network_error("Network Error", Some("ERR_NETWORK")));
        assert!(is_cors_or_network_error("blocked by CORS policy", Some("ERR_SERVER")));
        assert!(is_cors_or_network_error("blocked by CORS policy", None));
        assert!(!is_cors_or_network_error("Internal error", Some("ERR_SERVER")));
        assert!(!is_cors_or_network_error("blocked by cors policy", None));
        assert!(!is_cors_or_network_error("timeout of 10000ms exceeded", Some("ECONNABORTED")));
    }

    #[test]
    fn classifier_annotates_and_keeps_original_error() {
        let err = NetworkErrorClassifier.on_error(TransportError::network("Network Error"));
        assert!(err.cors_or_network);
        assert_eq!(err.message, "Network Error");
        assert_eq!(err.code.as_deref(), Some("ERR_NETWORK"));

        let err = NetworkErrorClassifier
            .on_error(TransportError::new("server exploded").with_code("ERR_SERVER"));
        assert!(!err.cors_or_network);
    }

    #[test]
    fn classifier_passes_responses_through() {
        let resp = HttpResponse {
            status: 418,
            headers: vec![("x-test".to_string(), "1".to_string())],
            body: "teapot".to_string(),
        };
        assert_eq!(NetworkErrorClassifier.on_response(resp.clone()), resp);
    }
}
