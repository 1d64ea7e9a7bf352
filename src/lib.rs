//! Client for the SimplePay v2 payment gateway.
//!
//! Requests are signed with HMAC-SHA384 over their canonical JSON body and
//! every gateway answer is verified the same way before it is trusted:
//! synchronous API responses, the signed result on the customer's redirect,
//! and asynchronous IPN callbacks.
//!
//! ```no_run
//! use simplepay::{GatewayConfig, PaymentData, SimplePayClient};
//!
//! # fn main() -> simplepay::Result<()> {
//! let client = SimplePayClient::new(GatewayConfig::from_env())?;
//! let response = client.start_payment(&PaymentData::new("order-1", "buyer@example.com", 1212))?;
//! println!("{:?}", response.payment_url);
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod client;
pub mod config;
pub mod decoder;
pub mod error;
pub mod ipn;
pub mod logging;
pub mod models;
pub mod reference;
pub mod signature;
pub mod transport;
pub mod util;

pub use client::SimplePayClient;
pub use config::{Endpoints, GatewayConfig, MerchantConfig, MerchantCredentials};
pub use decoder::decode_payment_response;
pub use error::{Error, GatewayError, Result};
pub use ipn::IpnAcknowledgement;
pub use models::{
    CardCancelResponse, Currency, Invoice, Language, PaymentData, PaymentEvent, PaymentMethod,
    PaymentResponse, PaymentResult, RecurringPaymentData, RecurringPaymentResponse,
    RecurringTerms, TokenPaymentData, TransactionId,
};
pub use signature::{sign, verify};
pub use transport::{HttpTransport, SignedRequest, Transport, TransportResponse};
