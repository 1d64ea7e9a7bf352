use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::Result;
use crate::reference;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl SignedRequest {
    /// JSON POST carrying `signature` in the `Signature` header.
    pub fn json(url: impl Into<String>, body: String, signature: String) -> Self {
        Self {
            url: url.into(),
            headers: vec![
                (
                    reference::CONTENT_TYPE_HEADER.to_string(),
                    reference::JSON_CONTENT_TYPE.to_string(),
                ),
                (reference::SIGNATURE_HEADER.to_string(), signature),
            ],
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body text exactly as received.
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Sends one request and returns one response. No retries.
pub trait Transport {
    fn post(&self, request: &SignedRequest) -> Result<TransportResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, request: &SignedRequest) -> Result<TransportResponse> {
        (**self).post(request)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &SignedRequest) -> Result<TransportResponse> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body.clone()).send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // raw bytes, not text(): no charset sniffing between wire and verifier
        let body = String::from_utf8(response.bytes()?.to_vec())?;

        log::debug!("POST {} -> {}", request.url, status);
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
