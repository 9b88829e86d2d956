//! Build-time localization of a static HTML page.
//!
//! One authored template, annotated with `data-i18n*` markers, is rewritten
//! into one finished page per locale plus a multilingual `sitemap.xml`. All
//! work happens on text at build time; the output needs no runtime i18n.
//!
//! | Module | Role |
//! |--------|------|
//! | [`i18n`] | Locale registry, translation tables, rewrite metrics |
//! | [`markers`] | The five marker passes and the marker stripper |
//! | [`metadata`] | `lang`, `og:locale`, canonical URLs, hreflang and SEO title data |
//! | [`structured_data`] | JSON-LD field overlay |
//! | [`sitemap`] | Sitemap derived from the registry |
//! | [`pipeline`] | Per-locale pipeline and bundle orchestration |
//! | [`bundle`] | Build artifacts between bundling and writing |
//! | [`config`] | Environment configuration for the binaries |

pub mod bundle;
pub mod config;
pub mod error;
pub mod i18n;
pub mod markers;
pub mod metadata;
pub mod pipeline;
pub mod sitemap;
pub mod structured_data;

pub use bundle::Bundle;
pub use error::{LocalizeError, Result};
pub use i18n::{LocaleConfig, LocaleRegistry, TranslationDir, TranslationSource, TranslationTable};
pub use pipeline::{localize_document, BuildReport, LocalizedPage, Localizer};
