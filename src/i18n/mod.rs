//! Locales and translations.
//!
//! # Architecture
//!
//! - `registry`: the locales a site is rendered into, their URL prefixes and metadata values
//! - `translations`: per-locale flat translation tables and the loaders that produce them
//! - `metrics`: replaced/missing marker counts for one locale's run
//!
//! # Example
//!
//! ```rust,ignore
//! use static_i18n::i18n::{LocaleRegistry, TranslationDir, TranslationSource};
//!
//! let registry = LocaleRegistry::from_file("src/i18n/locales.json")?;
//! let czech = registry.require("cs")?;
//! let table = TranslationDir::new("src/i18n").load(&czech.code)?;
//! ```

mod metrics;
mod registry;
mod translations;

pub use metrics::{MetricsReport, PassCounts, RewriteMetrics};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use translations::{TranslationDir, TranslationSource, TranslationTable};

#[cfg(test)]
pub(crate) use registry::test_registry;
