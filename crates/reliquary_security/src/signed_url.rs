//! Stateless, time-bounded capability tokens for asset delivery.
//!
//! A token is `HMAC-SHA256(secret, "{asset_id}:{expires}")` in lowercase hex.
//! Nothing is stored server side; any instance holding the secret can verify.
//! Signing says nothing about visibility: callers must still check that the
//! asset is public before serving it.

use chrono::Utc;
use hmac::{Hmac, Mac};
use reliquary_error::{ConfigError, ReliquaryResult};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// A signed delivery link, ready to be rendered into a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedLink {
    /// Asset the link grants access to
    pub asset_id: String,
    /// Expiry as Unix epoch seconds
    pub expires: i64,
    /// Hex-encoded signature
    pub signature: String,
}

impl SignedLink {
    /// Render the query string carrying expiry and signature.
    ///
    /// # Example
    ///
    /// ```
    /// use reliquary_security::SignedLink;
    ///
    /// let link = SignedLink {
    ///     asset_id: "abc".to_string(),
    ///     expires: 1_700_000_000,
    ///     signature: "deadbeef".to_string(),
    /// };
    /// assert_eq!(link.query_string(), "expires=1700000000&signature=deadbeef");
    /// ```
    pub fn query_string(&self) -> String {
        format!("expires={}&signature={}", self.expires, self.signature)
    }
}

/// Issues and verifies signed links.
#[derive(Clone)]
pub struct SignedUrlService {
    mac: HmacSha256,
}

impl std::fmt::Debug for SignedUrlService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedUrlService")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SignedUrlService {
    /// Create a service keyed by `secret`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty secret.
    pub fn new(secret: impl AsRef<[u8]>) -> ReliquaryResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ConfigError::new("signing secret must not be empty").into());
        }

        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| ConfigError::new(format!("invalid signing secret: {}", e)))?;
        Ok(Self { mac })
    }

    /// Signature for `asset_id` expiring at `expires` (epoch seconds).
    ///
    /// Deterministic: the same inputs always give the same signature.
    pub fn sign(&self, asset_id: &str, expires: i64) -> String {
        let mut mac = self.mac.clone();
        mac.update(format!("{}:{}", asset_id, expires).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a signature against the current time.
    pub fn verify(&self, asset_id: &str, expires: i64, signature: &str) -> bool {
        self.verify_at(asset_id, expires, signature, Utc::now().timestamp())
    }

    /// Check a signature against `now` (epoch seconds).
    ///
    /// Expired links are refused before any cryptographic work.
    pub fn verify_at(&self, asset_id: &str, expires: i64, signature: &str, now: i64) -> bool {
        if now > expires {
            tracing::debug!(asset_id, expires, now, "Signed link expired");
            return false;
        }

        let expected = self.sign(asset_id, expires);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }

    /// Issue a link for `asset_id` valid for `ttl` from now.
    pub fn issue(&self, asset_id: &str, ttl: Duration) -> SignedLink {
        self.issue_at(asset_id, ttl, Utc::now().timestamp())
    }

    /// Issue a link valid for `ttl` from `now` (epoch seconds).
    pub fn issue_at(&self, asset_id: &str, ttl: Duration, now: i64) -> SignedLink {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires = now.saturating_add(ttl_secs);
        SignedLink {
            asset_id: asset_id.to_string(),
            expires,
            signature: self.sign(asset_id, expires),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn service() -> SignedUrlService {
        SignedUrlService::new("test-secret").unwrap()
    }

    #[test]
    fn test_signature_is_deterministic_hex() {
        let a = service().sign("asset-1", NOW);
        let b = service().sign("asset-1", NOW);

        assert_eq!(a, b);
        assert_eq!(a.len(), 64, "HMAC-SHA256 hex should be 64 chars");
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_accepts_exact_pair_only() {
        let service = service();
        let signature = service.sign("asset-1", NOW + 60);

        assert!(service.verify_at("asset-1", NOW + 60, &signature, NOW));
        assert!(!service.verify_at("asset-2", NOW + 60, &signature, NOW));
        assert!(!service.verify_at("asset-1", NOW + 61, &signature, NOW));
        assert!(!service.verify_at("asset-1", NOW + 60, "deadbeef", NOW));
    }

    #[test]
    fn test_expired_signature_is_refused() {
        let service = service();
        let signature = service.sign("asset-1", NOW);

        assert!(service.verify_at("asset-1", NOW, &signature, NOW));
        assert!(!service.verify_at("asset-1", NOW, &signature, NOW + 1));
    }

    #[test]
    fn test_different_secrets_disagree() {
        let other = SignedUrlService::new("other-secret").unwrap();
        let signature = service().sign("asset-1", NOW);

        assert!(!other.verify_at("asset-1", NOW, &signature, NOW));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(SignedUrlService::new("").is_err());
    }

    #[test]
    fn test_issue_sets_expiry_from_ttl() {
        let service = service();
        let link = service.issue_at("asset-1", Duration::from_secs(300), NOW);

        assert_eq!(link.expires, NOW + 300);
        assert!(service.verify_at("asset-1", link.expires, &link.signature, NOW + 299));
        assert!(!service.verify_at("asset-1", link.expires, &link.signature, NOW + 301));
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains("test-secret"));
    }

    #[test]
    fn test_verify_uses_wall_clock() {
        let service = service();
        let future = Utc::now().timestamp() + 3600;
        let past = Utc::now().timestamp() - 1;

        assert!(service.verify("a", future, &service.sign("a", future)));
        assert!(!service.verify("a", past, &service.sign("a", past)));
    }
}
