use anyhow::{Context, Result};
use static_i18n::config::Config;
use static_i18n::{Bundle, LocaleRegistry, Localizer, TranslationDir};
use tracing::{debug, info};

fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("static_i18n=info".parse()?),
        )
        .init();

    info!("Starting localization build");

    let config = Config::from_env()?;

    let registry = LocaleRegistry::from_file(&config.locales_file).with_context(|| {
        format!(
            "Failed to load locale registry from {}",
            config.locales_file.display()
        )
    })?;
    info!(
        "Loaded {} locales (default: {})",
        registry.locales().len(),
        registry.default_locale().code
    );

    let translations = TranslationDir::new(&config.translations_dir);

    let mut bundle = Bundle::from_dir(&config.dist_dir)
        .with_context(|| format!("Failed to read build output {}", config.dist_dir.display()))?;

    if bundle.is_empty() {
        info!("Nothing to localize in {}", config.dist_dir.display());
        return Ok(());
    }

    let report = Localizer::new(&registry, &translations)
        .transform_bundle(&mut bundle)
        .context("Localization failed")?;

    for metrics in &report.metrics {
        debug!("Metrics: {}", serde_json::to_string(metrics)?);
    }

    let written = bundle
        .write_to(&config.dist_dir)
        .context("Failed to write localized pages")?;

    info!("✓ Wrote {} files to {}", written.len(), config.dist_dir.display());
    Ok(())
}
