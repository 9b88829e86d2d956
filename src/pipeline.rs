//! Per-locale localization pipeline and bundle orchestration.
//!
//! For one source document and one locale the passes run in a fixed order,
//! each consuming the previous pass's output:
//!
//! ```text
//! marker passes -> metadata -> structured data -> strip markers
//! ```
//!
//! [`Localizer::transform_bundle`] runs that pipeline once per registered
//! locale, in registry order, and only touches the bundle once every locale
//! has succeeded.

use crate::bundle::Bundle;
use crate::error::Result;
use crate::i18n::{
    LocaleConfig, LocaleRegistry, MetricsReport, RewriteMetrics, TranslationSource,
    TranslationTable,
};
use crate::markers::{apply_markers, strip_markers};
use crate::metadata::rewrite_metadata;
use crate::sitemap::{generate_sitemap, generate_sitemap_today, SITEMAP_FILE};
use crate::structured_data::{rewrite_structured_data, StructuredDataOutcome};
use chrono::NaiveDate;
use tracing::{debug, info};

/// One locale's finished document.
#[derive(Debug, Clone)]
pub struct LocalizedPage {
    pub locale: String,
    pub html: String,
    pub metrics: RewriteMetrics,
}

/// Localize `source` for `locale` using an already loaded table.
///
/// This is a pure function of its inputs.
///
/// # Errors
/// `MissingHeadTerminator` if the document has no `</head>`.
pub fn localize_document(
    source: &str,
    registry: &LocaleRegistry,
    locale: &LocaleConfig,
    translations: &TranslationTable,
) -> Result<LocalizedPage> {
    let mut metrics = RewriteMetrics::new();

    let html = apply_markers(source, translations, &mut metrics);
    let html = rewrite_metadata(&html, registry, locale, translations)?;
    let html = match rewrite_structured_data(&html, translations) {
        StructuredDataOutcome::Updated { html, fields } => {
            metrics.record_structured_data(fields);
            html
        }
        StructuredDataOutcome::Unchanged => html,
        StructuredDataOutcome::Unparseable => {
            metrics.record_structured_data_skipped();
            html
        }
    };
    let html = strip_markers(&html);

    Ok(LocalizedPage {
        locale: locale.code.clone(),
        html,
        metrics,
    })
}

/// What a bundle transformation produced.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// The HTML artifact that was localized, `None` for asset-only bundles
    pub entry: Option<String>,

    /// Bundle file names written for each locale, in registry order
    pub pages: Vec<String>,

    /// Per-locale rewrite metrics, in registry order
    pub metrics: Vec<MetricsReport>,
}

/// Runs the pipeline for every locale of a registry.
pub struct Localizer<'a, S: TranslationSource> {
    registry: &'a LocaleRegistry,
    translations: &'a S,
    lastmod: Option<NaiveDate>,
}

impl<'a, S: TranslationSource> Localizer<'a, S> {
    pub fn new(registry: &'a LocaleRegistry, translations: &'a S) -> Self {
        Self {
            registry,
            translations,
            lastmod: None,
        }
    }

    /// Set the date stamped into the sitemap (defaults to today, UTC).
    pub fn with_lastmod(mut self, lastmod: NaiveDate) -> Self {
        self.lastmod = Some(lastmod);
        self
    }

    /// Localize `source` for the locale with `code`.
    ///
    /// # Errors
    /// `UnknownLocale` for a code outside the registry, the loader's error when
    /// its table cannot be loaded, or `MissingHeadTerminator`.
    pub fn localize(&self, source: &str, code: &str) -> Result<LocalizedPage> {
        let locale = self.registry.require(code)?;
        let translations = self.translations.load(&locale.code)?;
        let page = localize_document(source, self.registry, locale, &translations)?;

        debug!(
            "Localized '{}': {} markers replaced, {} missing",
            locale.code,
            page.metrics.replaced(),
            page.metrics.missing()
        );
        Ok(page)
    }

    /// Localize the bundle's HTML artifact into every locale and emit the
    /// sitemap.
    ///
    /// The default locale's page replaces the artifact; every other locale is
    /// emitted as `<prefix>/index.html`. A bundle without HTML is left alone.
    pub fn transform_bundle(&self, bundle: &mut Bundle) -> Result<BuildReport> {
        let Some(entry) = bundle.html_entry().map(str::to_string) else {
            info!("No HTML artifact in bundle, skipping localization");
            return Ok(BuildReport::default());
        };
        let source = bundle.get(&entry).unwrap_or_default().to_string();

        info!(
            "Localizing {} into {} locales",
            entry,
            self.registry.locales().len()
        );

        // Build every page before touching the bundle so a failing locale
        // leaves it as it was.
        let mut pages = Vec::with_capacity(self.registry.locales().len());
        for locale in self.registry.locales() {
            let page = self.localize(&source, &locale.code)?;
            let file_name = locale.output_file().unwrap_or_else(|| entry.clone());
            pages.push((file_name, page));
        }

        let mut report = BuildReport {
            entry: Some(entry.clone()),
            ..BuildReport::default()
        };
        for (file_name, page) in pages {
            let metrics = page.metrics.report(&page.locale);
            info!(
                "✓ {} -> {} ({} replaced, {} missing)",
                page.locale, file_name, metrics.replaced, metrics.missing
            );

            if file_name == entry {
                bundle.replace(&entry, page.html);
            } else {
                bundle.emit(file_name.clone(), page.html);
            }
            report.pages.push(file_name);
            report.metrics.push(metrics);
        }

        let sitemap = match self.lastmod {
            Some(lastmod) => generate_sitemap(self.registry, lastmod),
            None => generate_sitemap_today(self.registry),
        };
        bundle.emit(SITEMAP_FILE, sitemap);
        info!("✓ Generated {}", SITEMAP_FILE);

        Ok(report)
    }
}
