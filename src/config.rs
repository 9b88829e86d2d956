use anyhow::{bail, Result};
use std::env::VarError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Build output holding the bundled HTML
    pub dist_dir: PathBuf,

    // Translations: <translations_dir>/<locale>.json
    pub translations_dir: PathBuf,

    // Locale registry (JSON)
    pub locales_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dist_dir = env_path("I18N_DIST_DIR")?.unwrap_or_else(|| PathBuf::from("dist"));
        let translations_dir =
            env_path("I18N_TRANSLATIONS_DIR")?.unwrap_or_else(|| PathBuf::from("src/i18n"));
        let locales_file = env_path("I18N_LOCALES_FILE")?
            .unwrap_or_else(|| translations_dir.join("locales.json"));

        Ok(Self {
            dist_dir,
            translations_dir,
            locales_file,
        })
    }
}

/// Read a path from the environment; unset or blank means "use the default".
fn env_path(name: &str) -> Result<Option<PathBuf>> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(PathBuf::from(value.trim()))),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => bail!("{} is not valid UTF-8", name),
    }
}
