use thiserror::Error;

use crate::models::Currency;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The currency tag is not one the gateway client knows about.
    #[error("unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// Merchant key and/or merchant id are not configured for the currency.
    #[error("missing SimplePay configuration for {currency}")]
    MissingConfiguration { currency: Currency },

    #[error("merchant id not found in configuration: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("SimplePay API error: {0}")]
    Gateway(GatewayError),

    #[error("missing response signature")]
    MissingResponseSignature,

    #[error("invalid response signature")]
    InvalidResponseSignature,

    #[error("invalid IPN signature")]
    InvalidIpnSignature,

    /// The notification is valid JSON but not a JSON object.
    #[error("IPN body is not a JSON object")]
    MalformedIpnBody,

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    pub fn is_gateway_error(&self) -> bool {
        matches!(self, Error::Gateway(_))
    }
}

/// Failure reported by the gateway itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("error codes [{}]", .0.join(", "))]
    ErrorCodes(Vec<String>),
}

impl From<GatewayError> for Error {
    fn from(err: GatewayError) -> Self {
        Error::Gateway(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GatewayError::Status(502), "SimplePay API error: HTTP status 502")]
    #[case(
        GatewayError::ErrorCodes(vec!["5321".to_string(), "5302".to_string()]),
        "SimplePay API error: error codes [5321, 5302]"
    )]
    fn gateway_error_messages(#[case] failure: GatewayError, #[case] expected: &str) {
        let err = Error::from(failure);
        assert!(err.is_gateway_error());
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn missing_configuration_names_currency() {
        let err = Error::MissingConfiguration {
            currency: Currency::HufSzep,
        };
        assert_eq!(err.to_string(), "missing SimplePay configuration for HUF_SZEP");
        assert!(!err.is_gateway_error());
    }
}
