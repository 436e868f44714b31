use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use crate::signing::{
    MerchantCredentials, ReceivedRequest, RequestSigner, SIGNED_HEADERS, SignatureVerifier,
    SigningContext, compute_digest,
};

fn base64_secret() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<u8>(), 1..64)
        .prop_map(|bytes| base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes))
}

fn signing_context(payload: &str, epoch_secs: i64) -> SigningContext {
    SigningContext::new(payload, Utc.timestamp_opt(epoch_secs, 0).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_digest_deterministic(payload in ".*") {
        prop_assert_eq!(compute_digest(&payload), compute_digest(&payload));
        prop_assert!(compute_digest(&payload).starts_with("SHA-256="));
    }

    #[test]
    fn test_digest_distinguishes_payloads(a in ".*", b in ".*") {
        prop_assume!(a != b);
        prop_assert_ne!(compute_digest(&a), compute_digest(&b));
    }

    #[test]
    fn test_headers_field_is_fixed(
        merchant_id in "[a-zA-Z0-9_]{1,32}",
        key_id in "[a-f0-9-]{1,36}",
        secret in base64_secret(),
        host in "[a-z0-9]+(\\.[a-z0-9]+){1,3}",
        payload in ".*",
        epoch in 0i64..4_102_444_800,
    ) {
        let credentials = MerchantCredentials::new(merchant_id, key_id, secret);
        let ctx = signing_context(&payload, epoch);

        let header = RequestSigner::new().sign(&ctx, &host, &credentials).unwrap();

        prop_assert_eq!(header.headers.as_str(), SIGNED_HEADERS);
        prop_assert_eq!(header.algorithm.as_str(), "HmacSHA256");
        prop_assert_eq!(header.key_id.as_str(), credentials.merchant_key_id());
    }

    #[test]
    fn test_sign_verify_roundtrip(
        merchant_id in "[a-zA-Z0-9_]{1,32}",
        key_id in "[a-f0-9-]{1,36}",
        secret in base64_secret(),
        host in "[a-z0-9]+(\\.[a-z0-9]+){1,3}",
        payload in ".*",
        epoch in 0i64..4_102_444_800,
    ) {
        let credentials = MerchantCredentials::new(merchant_id, key_id, secret);
        let ctx = signing_context(&payload, epoch);
        let headers = RequestSigner::new().sign_request(&ctx, &host, &credentials).unwrap();
        let signature = headers.signature.to_string();

        // digest recomputed from the transmitted bytes matches the signed digest
        prop_assert_eq!(&compute_digest(&ctx.payload), &headers.digest);

        let request = ReceivedRequest {
            host: &headers.host,
            date: &headers.date,
            resource_path: &ctx.resource_path,
            digest: &headers.digest,
            merchant_id: &headers.merchant_id,
            signature: &signature,
            body: ctx.payload.as_bytes(),
        };
        let result = SignatureVerifier::new().verify(&request, &credentials);
        prop_assert!(result.is_ok(), "verification failed: {:?}", result.err());
    }

    #[test]
    fn test_payload_change_changes_signature(
        secret in base64_secret(),
        a in ".*",
        b in ".*",
    ) {
        prop_assume!(a != b);
        let credentials = MerchantCredentials::new("m1", "key-1", secret);
        let signer = RequestSigner::new();

        let sig_a = signer.sign(&signing_context(&a, 1_704_067_200), "api.example.com", &credentials).unwrap();
        let sig_b = signer.sign(&signing_context(&b, 1_704_067_200), "api.example.com", &credentials).unwrap();

        prop_assert_ne!(sig_a.signature, sig_b.signature);
    }

    #[test]
    fn test_date_change_changes_signature(
        secret in base64_secret(),
        t in 0i64..4_102_444_800,
        dt in 1i64..86_400,
    ) {
        let credentials = MerchantCredentials::new("m1", "key-1", secret);
        let signer = RequestSigner::new();

        let early = signer.sign(&signing_context("{}", t), "api.example.com", &credentials).unwrap();
        let late = signer.sign(&signing_context("{}", t + dt), "api.example.com", &credentials).unwrap();

        prop_assert_ne!(early.signature, late.signature);
    }
}
