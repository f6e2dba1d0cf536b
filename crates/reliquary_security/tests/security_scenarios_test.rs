//! End-to-end checks of the security primitives through the public API.

use reliquary_security::{
    NormalizeOptions, OperationCategory, RateLimitConfig, RateLimiter, RateLimiters,
    SanitizeReason, SignedUrlService, caller_key, normalize_display_name,
};
use std::time::{Duration, Instant};

#[test]
fn passwd_traversal_is_neutralized() {
    let result = normalize_display_name("../../etc/passwd", &NormalizeOptions::default()).unwrap();

    assert!(!result.name().contains('/'));
    assert!(!result.name().contains('\\'));
    assert!(*result.sanitized());
    assert_eq!(*result.reason(), Some(SanitizeReason::PathSeparatorsDetected));
}

#[test]
fn limiter_allows_max_then_denies_until_window_elapses() {
    let max = 5;
    let window = Duration::from_millis(250);
    let limiter = RateLimiter::new(max, window);
    let start = Instant::now();

    for _ in 0..max {
        assert!(limiter.check_at("owner:u1", start));
    }
    assert!(!limiter.check_at("owner:u1", start));
    assert!(limiter.check_at("owner:u1", start + window));
}

#[test]
fn categories_have_separate_ceilings() {
    let config = RateLimitConfig::default()
        .with_upload_max(1)
        .with_read_max(2)
        .with_delete_max(1);
    let limiters = RateLimiters::from_config(&config);
    let key = caller_key(Some("u1"), None);

    assert!(limiters.check(OperationCategory::Upload, &key));
    assert!(!limiters.check(OperationCategory::Upload, &key));

    assert!(limiters.check(OperationCategory::Read, &key));
    assert!(limiters.check(OperationCategory::Read, &key));
    assert!(!limiters.check(OperationCategory::Read, &key));

    assert!(limiters.check(OperationCategory::Delete, &key));
}

#[test]
fn rate_limit_config_deserializes_with_defaults() {
    let config: RateLimitConfig = serde_json::from_str(r#"{"upload_max": 3}"#).unwrap();

    assert_eq!(*config.upload_max(), 3);
    assert_eq!(*config.window_ms(), 60_000);
    assert!(*config.enabled());
}

#[test]
fn signed_link_round_trip() {
    let service = SignedUrlService::new("s3cr3t").unwrap();
    let link = service.issue("asset-1", Duration::from_secs(60));

    assert!(service.verify(&link.asset_id, link.expires, &link.signature));
    assert!(!service.verify("asset-2", link.expires, &link.signature));
}
