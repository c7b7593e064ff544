//! src/retrieve/ky_http.rs
//!
//! KyHttp: single-shot HTTP helper. One request, no retries, an optional client
//! timeout, and errors split by where they happened (request construction vs.
//! transport). Callers own the returned response; dropping it releases the
//! connection whichever way the caller exits.
use crate::core::error::NgError;
use crate::loggers::Logger;
use reqwest::{header::HeaderMap, Client, Method, Response};
use std::time::Duration;

/// KyOptions
///
/// Public options for KyHttp.
#[derive(Clone, Debug, Default)]
pub struct KyOptions {
    /// Optional timeout for the whole request. `None` keeps reqwest's default.
    pub timeout: Option<Duration>,

    /// Optional timeout for the connect phase only.
    pub connect_timeout: Option<Duration>,
}

/// KyHttp
///
/// Primary HTTP helper.
#[derive(Clone)]
pub struct KyHttp {
    client: Client,
    logger: Logger,
    opts: KyOptions,
}

impl KyHttp {
    pub fn new(logger: Logger) -> Self {
        Self::new_with_opts(logger, None)
    }

    pub fn new_with_opts(logger: Logger, opts: Option<KyOptions>) -> Self {
        let opts = opts.unwrap_or_default();
        let mut builder = Client::builder();
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = opts.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder.build().unwrap_or_else(|_| Client::new());

        Self { client, logger, opts }
    }

    pub fn options(&self) -> &KyOptions {
        &self.opts
    }

    async fn request(&self, method: Method, url: &str, headers: HeaderMap) -> Result<Response, NgError> {
        crate::debug!(
            self.logger,
            "Request start",
            "method" => method.as_str(),
            "url" => url
        );

        let rb = self.client.request(method.clone(), url).headers(headers);

        // URL and header problems surface here, before anything touches the network
        let req = rb.build().map_err(|e| {
            crate::error!(self.logger, "Request build failed", "url" => url, "error" => e.to_string());
            NgError::RequestBuildError(e.to_string())
        })?;

        match self.client.execute(req).await {
            Ok(resp) => {
                crate::debug!(
                    self.logger,
                    "Response received",
                    "url" => url,
                    "status" => resp.status().as_u16()
                );
                Ok(resp)
            }
            Err(e) => {
                crate::error!(
                    self.logger,
                    "Network failure",
                    "url" => url,
                    "timeout" => e.is_timeout(),
                    "error" => e.to_string()
                );
                Err(NgError::TransportError(e.to_string()))
            }
        }
    }

    /// Public GET. Returns the response whatever its status.
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<Response, NgError> {
        self.request(Method::GET, url, headers).await
    }
}
