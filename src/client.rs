use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::canonical;
use crate::config::GatewayConfig;
use crate::decoder;
use crate::error::{Error, GatewayError, Result};
use crate::ipn::{self, IpnAcknowledgement};
use crate::models::{
    CardCancelRequest, CardCancelResponse, Currency, PaymentData, PaymentMethod, PaymentRequest,
    PaymentResponse, PaymentResult, Recurring, RecurringPaymentData, RecurringPaymentResponse,
    RecurringTerms, TokenPaymentData,
};
use crate::reference;
use crate::signature;
use crate::transport::{HttpTransport, SignedRequest, Transport};
use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    OneTime,
    Recurring,
    Token,
    CardCancel,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flow::OneTime => "oneTime",
            Flow::Recurring => "recurring",
            Flow::Token => "token",
            Flow::CardCancel => "cardCancel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct SimplePayClient<T = HttpTransport> {
    config: GatewayConfig,
    transport: T,
}

impl SimplePayClient<HttpTransport> {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env())
    }
}

impl<T: Transport> SimplePayClient<T> {
    pub fn with_transport(config: GatewayConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Starts a one-time payment and returns the gateway's payment page data.
    pub fn start_payment(&self, data: &PaymentData) -> Result<PaymentResponse> {
        self.start_payment_with_redirect(data, None)
    }

    /// Like [`SimplePayClient::start_payment`], with a return URL that wins
    /// over the configured one.
    pub fn start_payment_with_redirect(
        &self,
        data: &PaymentData,
        redirect_url: Option<&str>,
    ) -> Result<PaymentResponse> {
        let merchant = self.config.config_for(data.currency());
        let (merchant_key, merchant_id) = merchant.require_credentials()?;

        let url = self.redirect_url(redirect_url, reference::DEFAULT_REDIRECT_URL);
        let request = build_payment_request(merchant_id, data, url, Utc::now());
        self.execute(Flow::OneTime, &merchant.endpoints.payment, &request, merchant_key)
    }

    /// Starts a payment that also registers the card for later
    /// merchant-initiated charges. The response lists the stored-card tokens.
    pub fn start_recurring_payment(
        &self,
        data: &RecurringPaymentData,
    ) -> Result<RecurringPaymentResponse> {
        let merchant = self.config.config_for(data.payment.currency());
        let (merchant_key, merchant_id) = merchant.require_credentials()?;

        let url = self.redirect_url(None, reference::DEFAULT_REDIRECT_URL);
        let request = build_recurring_request(merchant_id, data, url, Utc::now());
        self.execute(Flow::Recurring, &merchant.endpoints.payment, &request, merchant_key)
    }

    /// Charges a previously stored card token without the customer present.
    pub fn start_token_payment(&self, data: &TokenPaymentData) -> Result<PaymentResponse> {
        let merchant = self.config.config_for(data.payment.currency());
        let (merchant_key, merchant_id) = merchant.require_credentials()?;

        let url = self.redirect_url(None, reference::DEFAULT_TOKEN_REDIRECT_URL);
        let request = build_token_request(merchant_id, data, url, Utc::now());
        self.execute(Flow::Token, &merchant.endpoints.recurring, &request, merchant_key)
    }

    /// Disables a registered card. Currency defaults to HUF.
    pub fn cancel_card(
        &self,
        card_id: &str,
        currency: Option<Currency>,
    ) -> Result<CardCancelResponse> {
        let merchant = self.config.config_for(currency.unwrap_or_default());
        let (merchant_key, merchant_id) = merchant.require_credentials()?;

        let request = CardCancelRequest {
            salt: util::random_salt(&mut rand::thread_rng()),
            card_id: card_id.to_string(),
            merchant: merchant_id.to_string(),
            sdk_version: merchant.sdk_version,
        };
        self.execute(Flow::CardCancel, &merchant.endpoints.card_cancel, &request, merchant_key)
    }

    /// Decodes the `r`/`s` pair the gateway appends to the return URL.
    pub fn get_payment_response(&self, payload: &str, signature: &str) -> Result<PaymentResult> {
        decoder::decode_payment_response(&self.config, payload, signature)
    }

    /// Acknowledges an IPN, taking the merchant key from the notification's
    /// merchant id.
    pub fn handle_ipn(&self, raw_body: &str, signature: &str) -> Result<IpnAcknowledgement> {
        let merchant_id = decoder::merchant_id_of(raw_body)?;
        let currency = self.config.currency_for_account_id(&merchant_id)?;
        let merchant = self.config.config_for(currency);
        let (merchant_key, _) = merchant.require_credentials()?;
        ipn::acknowledge(raw_body, signature, merchant_key)
    }

    fn redirect_url(&self, explicit: Option<&str>, fallback: &str) -> String {
        explicit
            .or(self.config.redirect_url.as_deref())
            .unwrap_or(fallback)
            .to_string()
    }

    fn execute<B, R>(&self, flow: Flow, endpoint: &str, body: &B, merchant_key: &str) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let body = canonical::to_canonical_json(body)?;
        let signature = signature::sign(&body, merchant_key);
        log::debug!("SimplePay/{flow}: POST {endpoint} ({} bytes)", body.len());

        let request = SignedRequest::json(endpoint, body, signature);
        let response = self.transport.post(&request)?;
        log::debug!("SimplePay/{flow}: status {}", response.status);

        if !response.is_success() {
            return Err(GatewayError::Status(response.status).into());
        }

        let response_signature = response
            .header(reference::SIGNATURE_HEADER)
            .ok_or(Error::MissingResponseSignature)?;

        let parsed: Value = serde_json::from_str(&response.body)?;
        if let Some(codes) = parsed.get("errorCodes").filter(|codes| !codes.is_null()) {
            let codes = error_codes(codes);
            log::warn!("SimplePay/{flow}: gateway returned error codes {codes:?}");
            return Err(GatewayError::ErrorCodes(codes).into());
        }

        if !signature::verify(&response.body, response_signature, merchant_key) {
            log::warn!("SimplePay/{flow}: response signature mismatch");
            return Err(Error::InvalidResponseSignature);
        }

        Ok(serde_json::from_value(parsed)?)
    }
}

fn error_codes(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(code_text).collect(),
        other => vec![code_text(other)],
    }
}

fn code_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn payment_timeout(now: DateTime<Utc>) -> String {
    util::format_timestamp(now + Duration::minutes(reference::PAYMENT_TIMEOUT_MINUTES))
}

pub(crate) fn build_payment_request(
    merchant_id: &str,
    data: &PaymentData,
    url: String,
    now: DateTime<Utc>,
) -> PaymentRequest {
    PaymentRequest {
        salt: util::random_salt(&mut rand::thread_rng()),
        merchant: merchant_id.to_string(),
        order_ref: data.order_ref.clone(),
        currency: data.currency().wire_code(),
        customer: None,
        customer_email: data.customer_email.clone(),
        language: data.language.unwrap_or_default(),
        sdk_version: reference::SDK_VERSION,
        methods: vec![data.method.unwrap_or_default()],
        recurring: None,
        token: None,
        transaction_type: None,
        three_ds_req_auth_method: None,
        total: data.total.clone(),
        timeout: payment_timeout(now),
        url,
        invoice: data.invoice.clone(),
    }
}

pub(crate) fn build_recurring_request(
    merchant_id: &str,
    data: &RecurringPaymentData,
    url: String,
    now: DateTime<Utc>,
) -> PaymentRequest {
    let mut request = build_payment_request(merchant_id, &data.payment, url, now);
    request.customer = Some(data.customer.clone());
    request.methods = vec![PaymentMethod::Card];
    request.recurring = Some(recurring_terms(&data.recurring, now));
    request.three_ds_req_auth_method = Some(reference::THREE_DS_REQ_AUTH_METHOD);
    request
}

pub(crate) fn build_token_request(
    merchant_id: &str,
    data: &TokenPaymentData,
    url: String,
    now: DateTime<Utc>,
) -> PaymentRequest {
    let mut request = build_payment_request(merchant_id, &data.payment, url, now);
    request.customer = Some(data.customer.clone());
    request.methods = vec![PaymentMethod::Card];
    request.token = Some(data.token.clone());
    request.transaction_type = Some(reference::MERCHANT_INITIATED_TYPE);
    request.three_ds_req_auth_method = Some(reference::THREE_DS_REQ_AUTH_METHOD);
    request
}

fn recurring_terms(terms: &RecurringTerms, now: DateTime<Utc>) -> Recurring {
    Recurring {
        times: terms
            .times
            .filter(|times| *times > 0)
            .unwrap_or(reference::DEFAULT_RECURRING_TIMES),
        until: terms.until.clone().unwrap_or_else(|| {
            util::format_timestamp(now + Duration::days(reference::DEFAULT_RECURRING_DAYS))
        }),
        max_amount: terms
            .max_amount
            .filter(|amount| *amount > 0)
            .unwrap_or(reference::DEFAULT_RECURRING_MAX_AMOUNT),
    }
}
