//! Asset visibility policy.

use serde::{Deserialize, Serialize};

/// Who may read an asset.
///
/// # Examples
///
/// ```
/// use reliquary_core::Visibility;
///
/// assert_eq!(Visibility::default(), Visibility::Private);
/// assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
/// assert_eq!(Visibility::Private.to_string(), "private");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    /// Readable only by the owner
    #[default]
    #[display("private")]
    Private,
    /// Readable by anyone, including signed-link bearers
    #[display("public")]
    Public,
}

impl Visibility {
    /// Convert to string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }

    /// Whether anyone may read the asset.
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}
