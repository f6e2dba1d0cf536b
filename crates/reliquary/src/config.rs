//! Configuration loading.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from reliquary.toml)
//! - User overrides (./reliquary.toml or ~/.config/reliquary/reliquary.toml)
//! - Environment overrides (`RELIQUARY__UPLOAD__MAX_SIZE_BYTES=...`)
//!
//! Limits are process-global: every caller shares the same allow-list and
//! size ceiling.

use derive_getters::Getters;
use reliquary_cache::AssetCacheConfig;
use reliquary_core::DEFAULT_ALLOWED_MIME_TYPES;
use reliquary_error::{ConfigError, ReliquaryError, ReliquaryResult};
use reliquary_security::{RateLimitConfig, RateLimiter, SignedUrlService};
use reliquary_storage::FileSystemStorage;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Longest display name the metadata store accepts.
pub const MAX_DISPLAY_NAME_LEN: usize = 255;

/// Upload limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct UploadConfig {
    /// MIME types the server accepts
    #[serde(default = "default_allowed_mime_types")]
    allowed_mime_types: Vec<String>,
    /// Largest accepted payload
    #[serde(default = "default_max_size_bytes")]
    max_size_bytes: usize,
    /// Longest display name kept after normalization
    #[serde(default = "default_max_display_name_len")]
    max_display_name_len: usize,
    /// Extension for generated fallback names
    #[serde(default = "default_fallback_extension")]
    fallback_extension: String,
}

fn default_allowed_mime_types() -> Vec<String> {
    DEFAULT_ALLOWED_MIME_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_size_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_display_name_len() -> usize {
    255
}

fn default_fallback_extension() -> String {
    ".bin".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_mime_types: default_allowed_mime_types(),
            max_size_bytes: default_max_size_bytes(),
            max_display_name_len: default_max_display_name_len(),
            fallback_extension: default_fallback_extension(),
        }
    }
}

/// Signed link settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct SigningConfig {
    /// HMAC secret; signed links are disabled without one
    #[serde(default)]
    secret: Option<String>,
    /// Lifetime of issued links in seconds
    #[serde(default = "default_ttl_secs")]
    default_ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    900
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            secret: None,
            default_ttl_secs: default_ttl_secs(),
        }
    }
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("default_ttl_secs", &self.default_ttl_secs)
            .finish()
    }
}

impl SigningConfig {
    /// Build the signing service, `None` when no secret is configured.
    pub fn service(&self) -> ReliquaryResult<Option<SignedUrlService>> {
        self.secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(SignedUrlService::new)
            .transpose()
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct StorageConfig {
    /// Directory holding blobs
    #[serde(default = "default_base_path")]
    base_path: PathBuf,
    /// URL prefix under which blobs are served directly
    #[serde(default)]
    public_base_url: Option<String>,
}

fn default_base_path() -> PathBuf {
    PathBuf::from("./data/blobs")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// Open the filesystem backend described by this section.
    pub fn open(&self) -> ReliquaryResult<FileSystemStorage> {
        let storage = FileSystemStorage::new(&self.base_path)?;
        Ok(match &self.public_base_url {
            Some(url) => storage.with_public_base_url(url.clone()),
            None => storage,
        })
    }
}

/// Top-level Reliquary configuration.
///
/// # Example
///
/// ```no_run
/// use reliquary::ReliquaryConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ReliquaryConfig::load()?;
/// println!("Max upload: {} bytes", config.upload.max_size_bytes());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ReliquaryConfig {
    /// Upload limits
    #[serde(default)]
    pub upload: UploadConfig,
    /// Rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Signed links
    #[serde(default)]
    pub signing: SigningConfig,
    /// Record cache
    #[serde(default)]
    pub cache: AssetCacheConfig,
    /// Blob storage
    #[serde(default)]
    pub storage: StorageConfig,
}


impl ReliquaryConfig {
    /// Load configuration from a specific file, without bundled defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ReliquaryResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ReliquaryError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ReliquaryError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence:
    ///
    /// 1. Environment (`RELIQUARY__SECTION__KEY`)
    /// 2. ./reliquary.toml
    /// 3. ~/.config/reliquary/reliquary.toml
    /// 4. Bundled defaults
    #[instrument]
    pub fn load() -> ReliquaryResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../reliquary.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/reliquary/reliquary.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("reliquary").required(false))
            .add_source(
                Environment::with_prefix("RELIQUARY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_mime_types"),
            );

        let config: Self = builder
            .build()
            .map_err(|e| {
                ReliquaryError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ReliquaryError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every request fail.
    pub fn validate(&self) -> ReliquaryResult<()> {
        if self.upload.allowed_mime_types.is_empty() {
            return Err(ConfigError::new("upload.allowed_mime_types must not be empty").into());
        }
        if self.upload.max_size_bytes == 0 {
            return Err(ConfigError::new("upload.max_size_bytes must be positive").into());
        }
        if self.upload.max_display_name_len == 0
            || self.upload.max_display_name_len > MAX_DISPLAY_NAME_LEN
        {
            return Err(ConfigError::new(format!(
                "upload.max_display_name_len must be between 1 and {}",
                MAX_DISPLAY_NAME_LEN
            ))
            .into());
        }
        if *self.rate_limit.enabled() {
            let window = u128::from(*self.rate_limit.window_ms());
            if window == 0 || window > RateLimiter::MAX_WINDOW.as_millis() {
                return Err(ConfigError::new(format!(
                    "rate_limit.window_ms must be between 1 and {}",
                    RateLimiter::MAX_WINDOW.as_millis()
                ))
                .into());
            }
        }
        if self.signing.default_ttl_secs == 0 {
            return Err(ConfigError::new("signing.default_ttl_secs must be positive").into());
        }
        Ok(())
    }
}
