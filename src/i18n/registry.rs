//! Locale registry: the set of locales a site is rendered into.
//!
//! The registry is plain data. It is built once per run (from a JSON file or
//! in code) and passed by reference into every rewrite pass, so each pass
//! stays a function of its inputs.

use crate::error::{LocalizeError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Configuration for one target locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    /// Short locale code, also the translation file stem (e.g. "en", "cs")
    pub code: String,

    /// URL path prefix the locale is served under ("" for the default locale)
    pub path_prefix: String,

    /// Value written to `<html lang="...">` and used as hreflang
    pub html_lang: String,

    /// Value written to `<meta property="og:locale">` (e.g. "cs_CZ")
    pub og_locale: String,
}

impl LocaleConfig {
    /// Create a locale whose `html_lang` and `og_locale` fall back to the code.
    pub fn new(code: impl Into<String>, path_prefix: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            html_lang: code.clone(),
            og_locale: code.clone(),
            code,
            path_prefix: path_prefix.into(),
        }
    }

    pub fn with_html_lang(mut self, html_lang: impl Into<String>) -> Self {
        self.html_lang = html_lang.into();
        self
    }

    pub fn with_og_locale(mut self, og_locale: impl Into<String>) -> Self {
        self.og_locale = og_locale.into();
        self
    }

    /// Output path of this locale's page, relative to the build root.
    ///
    /// Returns `None` for a locale served at the root.
    pub fn output_file(&self) -> Option<String> {
        let dir = self.path_prefix.trim_start_matches('/');
        if dir.is_empty() {
            None
        } else {
            Some(format!("{}/index.html", dir))
        }
    }
}

/// The ordered set of locales plus the designated default and site domain.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    domain: String,
    locales: Vec<LocaleConfig>,
    default_index: usize,
}

/// On-disk shape of the registry file
#[derive(Debug, Deserialize)]
struct RawRegistry {
    domain: String,
    default_locale: String,
    locales: Vec<RawLocale>,
}

#[derive(Debug, Deserialize)]
struct RawLocale {
    code: String,
    #[serde(default)]
    path_prefix: String,
    html_lang: Option<String>,
    og_locale: Option<String>,
}

/// A non-default prefix is `/segment(/segment)*` with no empty, `.` or `..`
/// segments, so the emitted page always lands inside the build directory.
fn is_valid_prefix(prefix: &str) -> bool {
    let Some(rest) = prefix.strip_prefix('/') else {
        return false;
    };
    rest.split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

impl LocaleRegistry {
    /// Build a registry, checking its invariants.
    ///
    /// # Errors
    /// `InvalidRegistry` when the default is not one of the locales, a code or
    /// prefix repeats, the default has a non-empty prefix, or another locale's
    /// prefix is empty, lacks a leading `/` or ends with `/`.
    pub fn new(
        domain: impl Into<String>,
        default_code: &str,
        locales: Vec<LocaleConfig>,
    ) -> Result<Self> {
        let domain = domain.into().trim_end_matches('/').to_string();
        if domain.is_empty() {
            return Err(LocalizeError::InvalidRegistry(
                "domain must not be empty".to_string(),
            ));
        }

        let default_index = locales
            .iter()
            .position(|locale| locale.code == default_code)
            .ok_or_else(|| {
                LocalizeError::InvalidRegistry(format!(
                    "default locale '{}' is not in the locale list",
                    default_code
                ))
            })?;

        let mut codes = HashSet::new();
        let mut prefixes = HashSet::new();
        for (index, locale) in locales.iter().enumerate() {
            if locale.code.trim().is_empty() {
                return Err(LocalizeError::InvalidRegistry(
                    "locale code must not be empty".to_string(),
                ));
            }
            if !codes.insert(locale.code.as_str()) {
                return Err(LocalizeError::InvalidRegistry(format!(
                    "duplicate locale code '{}'",
                    locale.code
                )));
            }
            if !prefixes.insert(locale.path_prefix.as_str()) {
                return Err(LocalizeError::InvalidRegistry(format!(
                    "duplicate path prefix '{}' (locale '{}')",
                    locale.path_prefix, locale.code
                )));
            }

            if index == default_index {
                if !locale.path_prefix.is_empty() {
                    return Err(LocalizeError::InvalidRegistry(format!(
                        "default locale '{}' must be served at the root, got prefix '{}'",
                        locale.code, locale.path_prefix
                    )));
                }
            } else if !is_valid_prefix(&locale.path_prefix) {
                return Err(LocalizeError::InvalidRegistry(format!(
                    "locale '{}' needs a prefix like '/{}', got '{}'",
                    locale.code, locale.code, locale.path_prefix
                )));
            }
        }

        Ok(Self {
            domain,
            locales,
            default_index,
        })
    }

    /// Load a registry from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LocalizeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse a registry from JSON (useful for testing)
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawRegistry = serde_json::from_str(content)
            .map_err(|e| LocalizeError::InvalidRegistry(e.to_string()))?;

        let locales = raw
            .locales
            .into_iter()
            .map(|raw_locale| {
                let mut locale = LocaleConfig::new(raw_locale.code, raw_locale.path_prefix);
                if let Some(html_lang) = raw_locale.html_lang {
                    locale.html_lang = html_lang;
                }
                if let Some(og_locale) = raw_locale.og_locale {
                    locale.og_locale = og_locale;
                }
                locale
            })
            .collect();

        Self::new(raw.domain, &raw.default_locale, locales)
    }

    /// Site domain without a trailing slash (e.g. "https://example.test")
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// All locales in declaration order.
    pub fn locales(&self) -> &[LocaleConfig] {
        &self.locales
    }

    /// The locale served at the domain root.
    pub fn default_locale(&self) -> &LocaleConfig {
        &self.locales[self.default_index]
    }

    pub fn is_default(&self, locale: &LocaleConfig) -> bool {
        locale.code == self.default_locale().code
    }

    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// Like [`get_by_code`](Self::get_by_code), but an unknown code is an error.
    pub fn require(&self, code: &str) -> Result<&LocaleConfig> {
        self.get_by_code(code)
            .ok_or_else(|| LocalizeError::UnknownLocale(code.to_string()))
    }

    /// Canonical URL of a locale: `domain + path_prefix + "/"`.
    pub fn canonical_url(&self, locale: &LocaleConfig) -> String {
        format!("{}{}/", self.domain, locale.path_prefix)
    }

    /// Every (hreflang, url) pair for alternates, ending with `x-default`.
    pub fn alternates(&self) -> Vec<(String, String)> {
        let mut alternates: Vec<(String, String)> = self
            .locales
            .iter()
            .map(|locale| (locale.html_lang.clone(), self.canonical_url(locale)))
            .collect();
        alternates.push((
            "x-default".to_string(),
            self.canonical_url(self.default_locale()),
        ));
        alternates
    }
}

#[cfg(test)]
pub(crate) fn test_registry() -> LocaleRegistry {
    LocaleRegistry::new(
        "https://example.test",
        "en",
        vec![
            LocaleConfig::new("en", "").with_og_locale("en_US"),
            LocaleConfig::new("cs", "/cs").with_og_locale("cs_CZ"),
        ],
    )
    .expect("test registry is valid")
}
