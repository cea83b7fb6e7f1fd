//! Locale tag normalization.
//!
//! Every locale used as a map key goes through [`LocaleTag::parse`], so two
//! spellings of the same tag (`"EN"`, `" en "`, `"zh-Hans"` / `"ZH-hans"`)
//! always compare equal.

use std::borrow::Borrow;
use std::fmt;

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use unic_langid::LanguageIdentifier;

use crate::logger;

/// A normalized, lowercase locale identifier (e.g. `en`, `zh-hans`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocaleTag(String);

impl LocaleTag {
    /// Normalizes a locale candidate.
    ///
    /// Standard BCP 47 tags are canonicalized and lowercased. Anything else is
    /// reported as non-standard and kept as its trimmed, lowercased text.
    /// Blank input yields `None`.
    #[must_use]
    pub fn parse(candidate: &str) -> Option<Self> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = trimmed.parse::<LanguageIdentifier>().map_or_else(
            |_| {
                logger::current().warn(format!("'{trimmed}' locale is non-standard."));
                trimmed.to_lowercase()
            },
            |identifier| identifier.to_string().to_lowercase(),
        );

        Some(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocaleTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LocaleTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LocaleTag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LocaleTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for LocaleTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw).unwrap_or_default())
    }
}

/// Normalizes a list of locale candidates, dropping blank entries.
///
/// # Examples
/// ```
/// use routed_i18n::locale::normalize;
///
/// let tags = normalize(["EN", "", "zh-Hans"]);
/// assert_eq!(tags, ["en", "zh-hans"]);
/// ```
pub fn normalize<I, S>(candidates: I) -> Vec<LocaleTag>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates.into_iter().filter_map(|candidate| LocaleTag::parse(candidate.as_ref())).collect()
}
