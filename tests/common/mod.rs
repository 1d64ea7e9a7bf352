#![allow(dead_code)]

use std::sync::Mutex;

use simplepay::{Currency, GatewayConfig, SignedRequest, Transport, TransportResponse};

/// Records every request and answers each one with the same canned response.
pub struct RecordingTransport {
    response: TransportResponse,
    requests: Mutex<Vec<SignedRequest>>,
}

impl RecordingTransport {
    pub fn replying(status: u16, body: &str, signature: Option<&str>) -> Self {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(signature) = signature {
            headers.push(("signature".to_string(), signature.to_string()));
        }
        Self {
            response: TransportResponse {
                status,
                headers,
                body: body.to_string(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply signed with `key` over the exact `body`.
    pub fn signed(body: &str, key: &str) -> Self {
        Self::replying(200, body, Some(&simplepay::sign(body, key)))
    }

    pub fn requests(&self) -> Vec<SignedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn post(&self, request: &SignedRequest) -> simplepay::Result<TransportResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.response.clone())
    }
}

pub fn merchants() -> GatewayConfig {
    GatewayConfig::from_vars([
        ("SIMPLEPAY_MERCHANT_ID_HUF", "testId"),
        ("SIMPLEPAY_MERCHANT_KEY_HUF", "testKey"),
        ("SIMPLEPAY_MERCHANT_ID_HUF_SZEP", "testIdSzep"),
        ("SIMPLEPAY_MERCHANT_KEY_HUF_SZEP", "testKeySzep"),
        ("SIMPLEPAY_MERCHANT_ID_EUR", "merchantEuroId"),
        ("SIMPLEPAY_MERCHANT_KEY_EUR", "secretEuroKey"),
    ])
}

pub fn huf_only() -> GatewayConfig {
    GatewayConfig::sandbox().with_merchant(Currency::Huf, "testId", "testKey")
}
