use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use percent_encoding::percent_decode_str;
use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::models::{PaymentEvent, PaymentResult, TransactionId};
use crate::signature;

// padding is optional once the payload has been through a query string
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Deserialize)]
struct AccountProbe {
    m: String,
}

#[derive(Deserialize)]
struct RedirectPayload {
    r: i64,
    t: TransactionId,
    e: PaymentEvent,
    m: String,
    o: String,
    #[serde(default)]
    tokens: Option<Vec<String>>,
}

impl From<RedirectPayload> for PaymentResult {
    fn from(payload: RedirectPayload) -> Self {
        PaymentResult {
            response_code: payload.r,
            transaction_id: payload.t,
            event: payload.e,
            merchant_id: payload.m,
            order_ref: payload.o,
            tokens: payload.tokens,
        }
    }
}

/// Extracts the merchant id (`m`) from a gateway JSON message.
pub(crate) fn merchant_id_of(json: &str) -> Result<String> {
    let probe: AccountProbe = serde_json::from_str(json)?;
    Ok(probe.m)
}

/// Verifies and decodes a redirect payload.
///
/// `payload` is the base64 `r` parameter, `signature` the `s` parameter,
/// possibly still percent-encoded. The merchant key is chosen by looking up
/// the payload's merchant id, and the signature is checked over the decoded
/// text exactly as it was carried.
pub fn decode_payment_response(
    config: &GatewayConfig,
    payload: &str,
    signature: &str,
) -> Result<PaymentResult> {
    let signature = percent_decode_str(signature)
        .decode_utf8()
        .map_err(|_| Error::InvalidResponseSignature)?;
    let decoded = String::from_utf8(PAYLOAD_ENGINE.decode(payload.trim())?)?;

    let merchant_id = merchant_id_of(&decoded)?;
    let currency = config.currency_for_account_id(&merchant_id)?;
    let merchant = config.config_for(currency);
    let (merchant_key, _) = merchant.require_credentials()?;

    if !signature::verify(&decoded, &signature, merchant_key) {
        log::warn!("SimplePay/getPaymentResponse: signature mismatch for merchant {merchant_id}");
        return Err(Error::InvalidResponseSignature);
    }

    let payload: RedirectPayload = serde_json::from_str(&decoded)?;
    Ok(payload.into())
}
