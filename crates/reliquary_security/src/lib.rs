//! Security primitives for the Reliquary asset service.
//!
//! This crate provides the pieces that make the service safe to expose:
//!
//! 1. **Name normalization** - untrusted display names reduced to a safe alphabet
//! 2. **Rate limiting** - per-key fixed-window counters per operation category
//! 3. **Signed links** - stateless HMAC capability tokens with an expiry

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod normalize;
mod rate_limit;
mod signed_url;

pub use normalize::{
    NormalizeMode, NormalizeOptions, NormalizedName, SanitizeReason, normalize_display_name,
};
pub use rate_limit::{
    OperationCategory, RateLimitConfig, RateLimiter, RateLimiters, caller_key,
};
pub use signed_url::{SignedLink, SignedUrlService};
