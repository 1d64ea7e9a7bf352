use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::reference;
use crate::signature;
use crate::util;

/// Body and signature to send back verbatim, with HTTP 200,
/// `Content-Type: application/json` and the signature in `Signature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpnAcknowledgement {
    pub body: String,
    pub signature: String,
}

impl IpnAcknowledgement {
    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            (reference::CONTENT_TYPE_HEADER, reference::JSON_CONTENT_TYPE),
            (reference::SIGNATURE_HEADER, self.signature.as_str()),
        ]
    }
}

pub fn acknowledge(raw_body: &str, signature: &str, merchant_key: &str) -> Result<IpnAcknowledgement> {
    acknowledge_at(raw_body, signature, merchant_key, Utc::now())
}

/// [`acknowledge`] with an explicit receipt instant.
pub fn acknowledge_at(
    raw_body: &str,
    signature: &str,
    merchant_key: &str,
    received_at: DateTime<Utc>,
) -> Result<IpnAcknowledgement> {
    if !signature::verify(raw_body, signature, merchant_key) {
        log::warn!("SimplePay/ipn: incoming signature mismatch");
        return Err(Error::InvalidIpnSignature);
    }

    // well-formedness only; the reply is the raw text with one member spliced in,
    // re-serializing could reorder members or change scalar types
    let members = match serde_json::from_str::<Value>(raw_body)? {
        Value::Object(members) => members,
        _ => return Err(Error::MalformedIpnBody),
    };

    let body = splice_receive_date(raw_body, members.is_empty(), received_at);
    let signature = signature::sign(&body, merchant_key);
    log::debug!("SimplePay/ipn: acknowledged {} byte notification", raw_body.len());

    Ok(IpnAcknowledgement { body, signature })
}

/// `raw_body` must be a well-formed JSON object.
fn splice_receive_date(raw_body: &str, empty: bool, received_at: DateTime<Utc>) -> String {
    let trimmed = raw_body.trim_end();
    let head = trimmed.strip_suffix('}').unwrap_or(trimmed);
    let separator = if empty { "" } else { "," };
    format!(
        "{head}{separator}\"{}\":\"{}\"}}",
        reference::IPN_RECEIVE_DATE_FIELD,
        util::format_timestamp(received_at)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 4, 17, 46, 22).unwrap()
    }

    fn signed(body: &str, key: &str) -> String {
        signature::sign(body, key)
    }

    #[rstest]
    fn appends_receive_date_last(received_at: DateTime<Utc>) {
        let raw = r#"{"r":0,"t":"504233881","e":"SUCCESS","m":"testId","o":"test-order-123"}"#;
        let ack = acknowledge_at(raw, &signed(raw, "testKey"), "testKey", received_at).unwrap();
        assert_eq!(
            ack.body,
            r#"{"r":0,"t":"504233881","e":"SUCCESS","m":"testId","o":"test-order-123","receiveDate":"2024-12-04T17:46:22+00:00"}"#
        );
        assert!(signature::verify(&ack.body, &ack.signature, "testKey"));
    }

    #[rstest]
    fn numeric_fields_stay_numeric(received_at: DateTime<Utc>) {
        let raw = r#"{"r":0,"t":508163884,"e":"SUCCESS","m":"X","o":"Y"}"#;
        let ack = acknowledge_at(raw, &signed(raw, "k"), "k", received_at).unwrap();
        assert!(ack.body.starts_with(r#"{"r":0,"t":508163884,"e":"SUCCESS","m":"X","o":"Y","receiveDate":"#));
        assert!(!ack.body.contains(char::is_whitespace));
    }

    #[rstest]
    fn nested_objects_are_untouched(received_at: DateTime<Utc>) {
        let raw = r#"{"o":"a/b","cardMask":"4908-xxxx","payer":{"name":"x"},"total":1212.5}"#;
        let ack = acknowledge_at(raw, &signed(raw, "k"), "k", received_at).unwrap();
        assert_eq!(
            ack.body,
            r#"{"o":"a/b","cardMask":"4908-xxxx","payer":{"name":"x"},"total":1212.5,"receiveDate":"2024-12-04T17:46:22+00:00"}"#
        );
    }

    #[rstest]
    fn trailing_whitespace_is_dropped(received_at: DateTime<Utc>) {
        let raw = "{\"r\":0}\r\n";
        let ack = acknowledge_at(raw, &signed(raw, "k"), "k", received_at).unwrap();
        assert_eq!(ack.body, r#"{"r":0,"receiveDate":"2024-12-04T17:46:22+00:00"}"#);
    }

    #[rstest]
    fn empty_object_gets_no_comma(received_at: DateTime<Utc>) {
        let ack = acknowledge_at("{}", &signed("{}", "k"), "k", received_at).unwrap();
        assert_eq!(ack.body, r#"{"receiveDate":"2024-12-04T17:46:22+00:00"}"#);
    }

    #[rstest]
    fn bad_signature_stops_before_reply(received_at: DateTime<Utc>) {
        let raw = r#"{"r":0}"#;
        let err = acknowledge_at(raw, "forged", "k", received_at).unwrap_err();
        assert!(matches!(err, Error::InvalidIpnSignature));
    }

    #[rstest]
    #[case("[1,2]")]
    #[case("\"text\"")]
    #[case("42")]
    fn rejects_non_object_bodies(received_at: DateTime<Utc>, #[case] raw: &str) {
        let err = acknowledge_at(raw, &signed(raw, "k"), "k", received_at).unwrap_err();
        assert!(matches!(err, Error::MalformedIpnBody));
    }

    #[rstest]
    fn rejects_truncated_json(received_at: DateTime<Utc>) {
        let raw = "{\"r\":";
        let err = acknowledge_at(raw, &signed(raw, "k"), "k", received_at).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[rstest]
    fn serializes_body_and_signature_together() {
        let ack = IpnAcknowledgement {
            body: r#"{"r":0}"#.to_string(),
            signature: "sig".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&ack).unwrap(),
            r#"{"body":"{\"r\":0}","signature":"sig"}"#
        );
    }

    #[rstest]
    fn headers_carry_signature() {
        let ack = IpnAcknowledgement {
            body: "{}".to_string(),
            signature: "sig".to_string(),
        };
        assert_eq!(
            ack.headers(),
            [("Content-Type", "application/json"), ("Signature", "sig")]
        );
    }
}
