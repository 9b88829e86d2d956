//! Translation tables and where they come from.
//!
//! A table is a flat `key -> string` map for one locale. Tables are loaded
//! fresh for each locale; nothing is merged or inherited between locales.

use crate::error::{LocalizeError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Flat translation table for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: HashMap<String, String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from a JSON object whose values are all strings.
    pub fn from_json_str(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let entries: HashMap<String, String> = serde_json::from_str(content)?;
        Ok(Self { entries })
    }

    /// Look up a key. `None` means the source text stays as authored.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a key, treating an empty value like a missing one.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Anything that can hand out the translation table for a locale code.
pub trait TranslationSource {
    /// # Errors
    /// `MissingTranslationFile` when no table exists for `locale`, or
    /// `MalformedTranslationFile` when it exists but cannot be parsed.
    fn load(&self, locale: &str) -> Result<TranslationTable>;
}

/// Translation files laid out as `<dir>/<locale>.json`.
#[derive(Debug, Clone)]
pub struct TranslationDir {
    dir: PathBuf,
}

impl TranslationDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, locale: &str) -> PathBuf {
        self.dir.join(format!("{}.json", locale))
    }
}

impl TranslationSource for TranslationDir {
    fn load(&self, locale: &str) -> Result<TranslationTable> {
        let path = self.path_for(locale);
        let content = std::fs::read_to_string(&path).map_err(|source| {
            LocalizeError::MissingTranslationFile {
                locale: locale.to_string(),
                path: path.clone(),
                source,
            }
        })?;

        let table = TranslationTable::from_json_str(&content).map_err(|source| {
            LocalizeError::MalformedTranslationFile {
                locale: locale.to_string(),
                path: path.clone(),
                source,
            }
        })?;

        if table.is_empty() {
            warn!("Translation file {} has no entries", path.display());
        }
        debug!(
            "Loaded {} translations for '{}' from {}",
            table.len(),
            locale,
            path.display()
        );
        Ok(table)
    }
}

/// In-memory tables keyed by locale code.
impl TranslationSource for HashMap<String, TranslationTable> {
    fn load(&self, locale: &str) -> Result<TranslationTable> {
        self.get(locale)
            .cloned()
            .ok_or_else(|| LocalizeError::MissingTranslationFile {
                locale: locale.to_string(),
                path: PathBuf::from(format!("<memory>/{}.json", locale)),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no table registered"),
            })
    }
}
