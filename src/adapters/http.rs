//! Backend HTTP client adapter.
//!
//! Implements [`HttpRequester`] with one blocking GET per call. The
//! socket timeout bounds the whole exchange so a dead backend costs at
//! most the configured read timeout, never a hung loop.

use crate::app::ports::{HttpRequester, HttpResponse};
use crate::error::HttpError;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
pub struct HttpAdapter {
    timeout_ms: u32,
}

#[cfg(feature = "espidf")]
impl HttpAdapter {
    pub fn new(cfg: &crate::config::ReporterConfig) -> Self {
        // One socket timeout covers connect and read on this client;
        // take the larger of the two configured bounds.
        Self {
            timeout_ms: cfg.connect_timeout_ms.max(cfg.read_timeout_ms),
        }
    }
}

#[cfg(feature = "espidf")]
impl HttpRequester for HttpAdapter {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::io::Read as _;

        let mut conn = EspHttpConnection::new(&Configuration {
            timeout: Some(core::time::Duration::from_millis(u64::from(self.timeout_ms))),
            ..Configuration::default()
        })
        .map_err(|_| HttpError::ConnectFailed)?;

        conn.initiate_request(Method::Get, url, &[])
            .map_err(|_| HttpError::ConnectFailed)?;
        conn.initiate_response().map_err(|_| HttpError::RequestFailed)?;
        let code = conn.status() as i16;

        let mut body = heapless::String::new();
        let mut buf = [0u8; 128];
        loop {
            let n = conn.read(&mut buf).map_err(|_| HttpError::RequestFailed)?;
            if n == 0 {
                break;
            }
            // Verdict bodies are ASCII; anything else is unparseable
            // upstream anyway.
            let chunk = core::str::from_utf8(&buf[..n]).map_err(|_| HttpError::RequestFailed)?;
            if body.push_str(chunk).is_err() {
                // Oversized body: keep the prefix, the markers are at
                // the front.
                break;
            }
        }

        Ok(HttpResponse { code, body })
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// Canned-response backend simulation. Responses are consumed in FIFO
/// order; a `get()` with no response queued fails the transport.
#[cfg(not(feature = "espidf"))]
pub struct HttpAdapter {
    responses: std::collections::VecDeque<Result<HttpResponse, HttpError>>,
    /// Every URL requested, in order.
    pub requests: Vec<String>,
}

#[cfg(not(feature = "espidf"))]
impl HttpAdapter {
    pub fn new() -> Self {
        Self {
            responses: std::collections::VecDeque::new(),
            requests: Vec::new(),
        }
    }

    /// Queue one successful response.
    pub fn sim_respond(&mut self, code: i16, body: &str) {
        let mut b = heapless::String::new();
        assert!(b.push_str(body).is_ok(), "sim body too long");
        self.responses.push_back(Ok(HttpResponse { code, body: b }));
    }

    /// Queue one transport failure.
    pub fn sim_fail(&mut self, error: HttpError) {
        self.responses.push_back(Err(error));
    }
}

#[cfg(not(feature = "espidf"))]
impl HttpRequester for HttpAdapter {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requests.push(url.to_owned());
        self.responses
            .pop_front()
            .unwrap_or(Err(HttpError::ConnectFailed))
    }
}
