//! Preview binary - renders one locale of a page to stdout without touching
//! the build output
//!
//! Usage:
//!   cargo run --bin preview -- cs                    # Localize dist/index.html into Czech
//!   cargo run --bin preview -- cs path/to/page.html  # Localize another template
//!
//! Uses the same environment variables as the main binary:
//! - I18N_DIST_DIR (defaults to dist)
//! - I18N_TRANSLATIONS_DIR (defaults to src/i18n)
//! - I18N_LOCALES_FILE (defaults to <translations dir>/locales.json)

use anyhow::{Context, Result};
use static_i18n::config::Config;
use static_i18n::{LocaleRegistry, Localizer, TranslationDir};
use std::fs;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Log to stderr so stdout carries only the page
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("preview=info".parse()?)
                .add_directive("static_i18n=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let locale = args
        .next()
        .context("Usage: preview <locale> [template.html]")?;

    let config = Config::from_env()?;
    let template = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.dist_dir.join("index.html"));

    let registry = LocaleRegistry::from_file(&config.locales_file)
        .context("Failed to load locale registry")?;
    let translations = TranslationDir::new(&config.translations_dir);

    let source = fs::read_to_string(&template)
        .with_context(|| format!("Failed to read {}", template.display()))?;

    let page = Localizer::new(&registry, &translations).localize(&source, &locale)?;
    let report = page.metrics.report(&page.locale);
    info!(
        "Localized {} into '{}': {} replaced, {} missing ({:.1}% coverage)",
        template.display(),
        report.locale,
        report.replaced,
        report.missing,
        report.coverage
    );

    println!("{}", page.html);
    Ok(())
}
