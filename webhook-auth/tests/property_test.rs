//! Property-based tests for Stripe signature verification.
//!
//! Exercises the sign/verify contract over arbitrary secrets, payload bytes
//! and header shapes rather than a handful of fixed vectors.

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use webhook_auth::error::{ErrorKind, WebhookErrorKind};
use webhook_auth::webhook::{compute_signature, StripeSignatureVerifier, Tolerance};

/// Strategy for realistic endpoint secrets.
fn secret_strategy() -> impl Strategy<Value = String> {
    "whsec_[a-zA-Z0-9]{1,40}"
}

/// Strategy for event bodies with arbitrary ids and padding.
fn event_body_strategy() -> impl Strategy<Value = Vec<u8>> {
    ("evt_[a-zA-Z0-9]{1,24}", "[a-z_.]{1,30}", "[ -~]{0,200}").prop_map(|(id, kind, note)| {
        serde_json::json!({
            "id": id,
            "type": kind,
            "object": "event",
            "data": { "object": { "note": note } }
        })
        .to_string()
        .into_bytes()
    })
}

fn at(timestamp: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap()
}

proptest! {
    #[test]
    fn signed_payload_always_verifies(
        secret in secret_strategy(),
        body in event_body_strategy(),
        timestamp in 1_000_000_000i64..4_000_000_000i64,
    ) {
        let signature = compute_signature(timestamp, &body, &secret).unwrap();
        let header = format!("t={timestamp},v1={signature}");
        let verifier = StripeSignatureVerifier::new(secret, Tolerance::default());

        let event = verifier.verify_at(&body, &header, at(timestamp)).unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&body).unwrap();
        prop_assert_eq!(event.id.as_str(), decoded["id"].as_str().unwrap());
    }

    #[test]
    fn any_signature_matches_on_raw_bytes(
        secret in secret_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..512),
        timestamp in 0i64..4_000_000_000i64,
    ) {
        // Arbitrary bytes are rarely JSON, so success or MalformedBody both prove the MAC matched.
        let signature = compute_signature(timestamp, &payload, &secret).unwrap();
        let header = format!("t={timestamp},v1={signature}");
        let verifier = StripeSignatureVerifier::new(secret, Tolerance::Ignored);

        match verifier.verify_at(&payload, &header, Utc::now()) {
            Ok(_) => {}
            Err(err) => prop_assert_eq!(
                err.error_kind,
                ErrorKind::Webhook(WebhookErrorKind::MalformedBody)
            ),
        }
    }

    #[test]
    fn single_bit_flip_is_rejected(
        secret in secret_strategy(),
        body in event_body_strategy(),
        timestamp in 1_000_000_000i64..4_000_000_000i64,
        bit in 0usize..256,
    ) {
        let signature = compute_signature(timestamp, &body, &secret).unwrap();
        let mut bytes = hex::decode(&signature).unwrap();
        bytes[bit / 8] ^= 1 << (bit % 8);
        let header = format!("t={timestamp},v1={}", hex::encode(bytes));
        let verifier = StripeSignatureVerifier::new(secret, Tolerance::default());

        let err = verifier.verify_at(&body, &header, at(timestamp)).unwrap_err();
        prop_assert_eq!(
            err.error_kind,
            ErrorKind::Webhook(WebhookErrorKind::SignatureMismatch)
        );
    }

    #[test]
    fn header_without_timestamp_is_always_malformed(
        secret in secret_strategy(),
        body in event_body_strategy(),
        timestamp in 1_000_000_000i64..4_000_000_000i64,
    ) {
        // Valid v1 for the intended timestamp, but the t entry is dropped.
        let signature = compute_signature(timestamp, &body, &secret).unwrap();
        let header = format!("v1={signature}");
        let verifier = StripeSignatureVerifier::new(secret, Tolerance::Ignored);

        let err = verifier.verify_at(&body, &header, at(timestamp)).unwrap_err();
        prop_assert_eq!(
            err.error_kind,
            ErrorKind::Webhook(WebhookErrorKind::MalformedHeader)
        );
    }

    #[test]
    fn one_good_v1_among_many_is_accepted(
        secret in secret_strategy(),
        body in event_body_strategy(),
        timestamp in 1_000_000_000i64..4_000_000_000i64,
        decoys in prop::collection::vec("[0-9a-f]{64}", 0..4),
        position in 0usize..5,
    ) {
        let signature = compute_signature(timestamp, &body, &secret).unwrap();
        let mut v1s = decoys;
        let position = position.min(v1s.len());
        v1s.insert(position, signature);

        let mut header = format!("t={timestamp}");
        for v1 in &v1s {
            header.push_str(&format!(",v1={v1}"));
        }
        let verifier = StripeSignatureVerifier::new(secret, Tolerance::default());

        prop_assert!(verifier.verify_at(&body, &header, at(timestamp)).is_ok());
    }
}
