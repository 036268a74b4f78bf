//! Executing prepared requests.
//!
//! The core never opens sockets on its own; a `Transport` is whatever the
//! host uses to perform the round-trip. `UreqTransport` is the blocking
//! implementation shipped with the crate.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform the round-trip. Non-2xx statuses are returned as responses;
    /// `Err` is reserved for requests that never got one.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq-transport")]
pub use self::ureq_impl::UreqTransport;

#[cfg(feature = "ureq-transport")]
mod ureq_impl {
    use ureq::{Agent, RequestBuilder};

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by ureq.
    ///
    /// One agent is shared by every request so connections are pooled; the
    /// timeout is applied per request from `HttpRequest::timeout`. Relative
    /// URLs (the development `/api` base) are resolved against `origin`,
    /// which plays the part of the page origin the dev proxy is served from.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: Agent,
        origin: Option<String>,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            // Statuses are data here; the client decides what a 4xx means.
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self {
                agent,
                origin: None,
            }
        }

        pub fn with_origin(origin: &str) -> Self {
            Self {
                origin: Some(origin.trim_end_matches('/').to_string()),
                ..Self::new()
            }
        }

        fn absolute_url(&self, url: &str) -> Result<String, TransportError> {
            if url.starts_with("http://") || url.starts_with("https://") {
                return Ok(url.to_string());
            }
            match &self.origin {
                Some(origin) => Ok(format!("{origin}{url}")),
                None => Err(TransportError::new(format!(
                    "relative URL {url} requires an origin"
                ))),
            }
        }
    }

    /// Copy headers and the per-request timeout onto a ureq builder.
    fn apply<B>(builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
        let mut builder = builder
            .config()
            .timeout_global(Some(request.timeout))
            .build();
        for (k, v) in &request.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        builder
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = self.absolute_url(&request.url)?;

            tracing::debug!(method = request.method.as_str(), %url, "sending request");

            let result = match request.method {
                HttpMethod::Get => apply(self.agent.get(&url), request).call(),
                HttpMethod::Delete => apply(self.agent.delete(&url), request).call(),
                HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
                    let builder = match request.method {
                        HttpMethod::Post => self.agent.post(&url),
                        HttpMethod::Put => self.agent.put(&url),
                        _ => self.agent.patch(&url),
                    };
                    let builder = apply(builder, request);
                    match &request.body {
                        Some(body) => builder.send(body.as_bytes()),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(map_error)?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| {
                    v.to_str()
                        .ok()
                        .map(|v| (k.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(map_error)?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    /// Only failures to reach the peer count as network errors. Local
    /// failures (bad header value, bad URI) carry no code.
    fn map_error(err: ureq::Error) -> TransportError {
        match err {
            ureq::Error::Timeout(_) => TransportError::timeout(err.to_string()),
            ureq::Error::Io(_) | ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                TransportError::network(err.to_string())
            }
            _ => TransportError::new(err.to_string()),
        }
    }

}
