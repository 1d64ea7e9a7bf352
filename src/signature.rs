use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha384;
use subtle::ConstantTimeEq;

type HmacSha384 = Hmac<Sha384>;

/// Computes the base64 encoded HMAC-SHA384 of `body` keyed with the trimmed
/// merchant key.
pub fn sign(body: impl AsRef<[u8]>, merchant_key: &str) -> String {
    let mut mac = HmacSha384::new_from_slice(merchant_key.trim().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body.as_ref());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Returns true when `signature` is the signature of `body` under `merchant_key`.
pub fn verify(body: impl AsRef<[u8]>, signature: &str, merchant_key: &str) -> bool {
    let expected = sign(body, merchant_key);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    fn signs_simple_body() {
        assert_eq!(
            sign(r#"{"a":1}"#, "secret"),
            "KRI+OgN4szTxH/ldLVrzkLbjVjsf99L8Ni32Hs8NJFqdf5WYakzfgbTuZOW+emyR"
        );
    }

    #[rstest]
    fn trims_key_whitespace() {
        let body = r#"{"test":"data"}"#;
        assert_eq!(sign(body, "  testKey\n"), sign(body, "testKey"));
    }

    #[rstest]
    #[case("invalid-signature")]
    #[case("")]
    #[case("KRI+OgN4szTxH/ldLVrzkLbjVjsf99L8Ni32Hs8NJFqdf5WYakzfgbTuZOW+emyS")]
    fn rejects_wrong_signature(#[case] candidate: &str) {
        assert!(!verify(r#"{"a":1}"#, candidate, "secret"));
    }

    #[rstest]
    fn signature_depends_on_exact_bytes() {
        let compact = r#"{"a":1}"#;
        let spaced = r#"{"a": 1}"#;
        let signature = sign(compact, "secret");
        assert!(verify(compact, &signature, "secret"));
        assert!(!verify(spaced, &signature, "secret"));
    }

    proptest! {
        #[test]
        fn sign_then_verify_holds(body in ".*", key in "[ -~]{0,64}") {
            let signature = sign(&body, &key);
            prop_assert!(verify(&body, &signature, &key));
        }

        #[test]
        fn different_signature_never_verifies(
            body in ".*",
            key in "[a-zA-Z0-9]{1,32}",
            candidate in "[A-Za-z0-9+/=]{0,64}",
        ) {
            let signature = sign(&body, &key);
            prop_assume!(candidate != signature);
            prop_assert!(!verify(&body, &candidate, &key));
        }
    }
}
