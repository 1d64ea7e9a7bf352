use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Currency tags a merchant account can be configured for.
///
/// `HufSzep` is the SZÉP voucher-card flavour of HUF: it has its own merchant
/// account but is charged in HUF on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "HUF")]
    Huf,
    #[serde(rename = "HUF_SZEP")]
    HufSzep,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Huf, Currency::HufSzep, Currency::Eur, Currency::Usd];

    pub fn tag(self) -> &'static str {
        match self {
            Currency::Huf => "HUF",
            Currency::HufSzep => "HUF_SZEP",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    /// ISO code sent in the request body.
    pub fn wire_code(self) -> &'static str {
        match self {
            Currency::Huf | Currency::HufSzep => "HUF",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.tag() == value)
            .ok_or_else(|| Error::UnsupportedCurrency {
                currency: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    Ar,
    Bg,
    Cs,
    De,
    En,
    Es,
    Fr,
    It,
    Hr,
    #[default]
    Hu,
    Pl,
    Ro,
    Ru,
    Sk,
    Tr,
    Zh,
}

impl Language {
    pub const ALL: [Language; 16] = [
        Language::Ar,
        Language::Bg,
        Language::Cs,
        Language::De,
        Language::En,
        Language::Es,
        Language::Fr,
        Language::It,
        Language::Hr,
        Language::Hu,
        Language::Pl,
        Language::Ro,
        Language::Ru,
        Language::Sk,
        Language::Tr,
        Language::Zh,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ar => "AR",
            Language::Bg => "BG",
            Language::Cs => "CS",
            Language::De => "DE",
            Language::En => "EN",
            Language::Es => "ES",
            Language::Fr => "FR",
            Language::It => "IT",
            Language::Hr => "HR",
            Language::Hu => "HU",
            Language::Pl => "PL",
            Language::Ro => "RO",
            Language::Ru => "RU",
            Language::Sk => "SK",
            Language::Tr => "TR",
            Language::Zh => "ZH",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = value.trim().to_uppercase();
        Language::ALL
            .into_iter()
            .find(|language| language.code() == code)
            .ok_or_else(|| format!("unsupported language: {value}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    #[default]
    Card,
    Wire,
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "CARD" => Ok(PaymentMethod::Card),
            "WIRE" => Ok(PaymentMethod::Wire),
            _ => Err(format!("unsupported payment method: {value}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub name: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub zip: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Caller-side description of a payment. Unset options fall back to HUF,
/// HU and CARD.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentData {
    pub order_ref: String,
    pub total: String,
    pub customer_email: String,
    pub currency: Option<Currency>,
    pub language: Option<Language>,
    pub method: Option<PaymentMethod>,
    pub invoice: Option<Invoice>,
}

impl PaymentData {
    pub fn new(
        order_ref: impl Into<String>,
        customer_email: impl Into<String>,
        total: impl ToString,
    ) -> Self {
        Self {
            order_ref: order_ref.into(),
            total: total.to_string(),
            customer_email: customer_email.into(),
            ..Self::default()
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.invoice = Some(invoice);
        self
    }

    pub fn currency(&self) -> Currency {
        self.currency.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurringTerms {
    pub times: Option<u32>,
    /// ISO-8601 timestamp after which the registered card may not be charged.
    pub until: Option<String>,
    pub max_amount: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurringPaymentData {
    pub payment: PaymentData,
    pub customer: String,
    pub recurring: RecurringTerms,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenPaymentData {
    pub payment: PaymentData,
    pub customer: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurring {
    pub times: u32,
    pub until: String,
    pub max_amount: u64,
}

/// Request body for the `/start` and `/dorecurring` endpoints. Member order
/// is the serialized order and is part of the signed bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub salt: String,
    pub merchant: String,
    pub order_ref: String,
    pub currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    pub customer_email: String,
    pub language: Language,
    pub sdk_version: &'static str,
    pub methods: Vec<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Recurring>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<&'static str>,
    #[serde(rename = "threeDSReqAuthMethod", skip_serializing_if = "Option::is_none")]
    pub three_ds_req_auth_method: Option<&'static str>,
    pub total: String,
    pub timeout: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCancelRequest {
    pub salt: String,
    pub card_id: String,
    pub merchant: String,
    pub sdk_version: &'static str,
}

/// Transaction ids arrive as JSON numbers or strings depending on the
/// endpoint; the original type is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionId::Numeric(id) => write!(f, "{id}"),
            TransactionId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub salt: Option<String>,
    pub merchant: Option<String>,
    pub order_ref: Option<String>,
    pub currency: Option<String>,
    pub transaction_id: Option<TransactionId>,
    pub timeout: Option<String>,
    pub total: Option<serde_json::Value>,
    pub payment_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurringPaymentResponse {
    #[serde(flatten)]
    pub payment: PaymentResponse,
    #[serde(default)]
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCancelResponse {
    pub salt: Option<String>,
    pub merchant: Option<String>,
    pub card_id: Option<String>,
    pub status: Option<String>,
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentEvent {
    Success,
    Fail,
    Timeout,
    Cancel,
}

/// Outcome of a payment as reported on the customer's redirect back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub response_code: i64,
    pub transaction_id: TransactionId,
    pub event: PaymentEvent,
    pub merchant_id: String,
    pub order_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("HUF", Currency::Huf, "HUF")]
    #[case("HUF_SZEP", Currency::HufSzep, "HUF")]
    #[case("EUR", Currency::Eur, "EUR")]
    #[case("USD", Currency::Usd, "USD")]
    fn parses_currency_tags(#[case] tag: &str, #[case] expected: Currency, #[case] wire: &str) {
        let currency: Currency = tag.parse().unwrap();
        assert_eq!(currency, expected);
        assert_eq!(currency.tag(), tag);
        assert_eq!(currency.wire_code(), wire);
    }

    #[rstest]
    fn rejects_unknown_currency() {
        let err = "GBP".parse::<Currency>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported currency: GBP");
    }

    #[rstest]
    #[case("hu", Language::Hu)]
    #[case("EN", Language::En)]
    #[case(" zh ", Language::Zh)]
    fn parses_languages(#[case] input: &str, #[case] expected: Language) {
        assert_eq!(input.parse::<Language>().unwrap(), expected);
    }

    #[rstest]
    fn payment_data_defaults() {
        let data = PaymentData::new("TEST123", "test@example.com", 1212);
        assert_eq!(data.total, "1212");
        assert_eq!(data.currency(), Currency::Huf);
        assert_eq!(data.language.unwrap_or_default(), Language::Hu);
        assert_eq!(data.method.unwrap_or_default(), PaymentMethod::Card);
    }

    #[rstest]
    fn decimal_total_keeps_fraction() {
        let data = PaymentData::new("A", "a@example.com", 12.5);
        assert_eq!(data.total, "12.5");
    }

    #[rstest]
    #[case("504233881", TransactionId::Numeric(504233881))]
    #[case("\"504233881\"", TransactionId::Text("504233881".to_string()))]
    fn transaction_id_keeps_json_type(#[case] json: &str, #[case] expected: TransactionId) {
        let parsed: TransactionId = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
    }

    #[rstest]
    fn invoice_omits_missing_optional_lines() {
        let invoice = Invoice {
            name: "Teszt Elek".to_string(),
            country: "HU".to_string(),
            state: "Budapest".to_string(),
            city: "Budapest".to_string(),
            zip: "1111".to_string(),
            address: "Fo utca 1".to_string(),
            address2: None,
            phone: Some("+36301234567".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&invoice).unwrap(),
            r#"{"name":"Teszt Elek","country":"HU","state":"Budapest","city":"Budapest","zip":"1111","address":"Fo utca 1","phone":"+36301234567"}"#
        );
    }

    #[rstest]
    fn recurring_response_reads_tokens() {
        let json = r#"{"transactionId":504233859,"orderRef":"r-1","total":1212,"tokens":["t1","t2"]}"#;
        let parsed: RecurringPaymentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.payment.transaction_id, Some(TransactionId::Numeric(504233859)));
        assert_eq!(parsed.payment.order_ref.as_deref(), Some("r-1"));
        assert_eq!(parsed.tokens, vec!["t1".to_string(), "t2".to_string()]);
    }
}
