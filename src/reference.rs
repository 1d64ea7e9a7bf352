pub const API_URL: &str = "https://secure.simplepay.hu/payment/v2";
pub const SANDBOX_API_URL: &str = "https://sandbox.simplepay.hu/payment/v2";

pub const PAYMENT_PATH: &str = "/start";
pub const RECURRING_PATH: &str = "/dorecurring";
pub const CARD_CANCEL_PATH: &str = "/cardcancel";

pub const SDK_VERSION: &str = "SimplePay_Rrd_0.11.0";

pub const SIGNATURE_HEADER: &str = "Signature";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

pub const ENV_MERCHANT_KEY_PREFIX: &str = "SIMPLEPAY_MERCHANT_KEY_";
pub const ENV_MERCHANT_ID_PREFIX: &str = "SIMPLEPAY_MERCHANT_ID_";
pub const ENV_PRODUCTION: &str = "SIMPLEPAY_PRODUCTION";
pub const ENV_REDIRECT_URL: &str = "SIMPLEPAY_REDIRECT_URL";
pub const ENV_LOGGER: &str = "SIMPLEPAY_LOGGER";
pub const ENV_API_URL: &str = "SIMPLEPAY_API_URL";

pub const DEFAULT_REDIRECT_URL: &str = "http://url.to.redirect";
pub const DEFAULT_TOKEN_REDIRECT_URL: &str = "http://recurring.url.to.redirect";

pub const PAYMENT_TIMEOUT_MINUTES: i64 = 30;

pub const DEFAULT_RECURRING_TIMES: u32 = 3;
pub const DEFAULT_RECURRING_MAX_AMOUNT: u64 = 12_000;
// six 30-day months
pub const DEFAULT_RECURRING_DAYS: i64 = 6 * 30;

/// Only registered customers may use card registration and token payments.
pub const THREE_DS_REQ_AUTH_METHOD: &str = "02";
pub const MERCHANT_INITIATED_TYPE: &str = "MIT";

pub const IPN_RECEIVE_DATE_FIELD: &str = "receiveDate";

pub fn base_url(production: bool) -> &'static str {
    if production {
        API_URL
    } else {
        SANDBOX_API_URL
    }
}
