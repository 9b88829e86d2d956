use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a localization build.
///
/// Missing translation keys and unparseable structured data are not errors:
/// those passes keep the source text and carry on.
#[derive(Debug, Error)]
pub enum LocalizeError {
    /// A locale code that is not part of the registry
    #[error("Unknown locale code: '{0}'")]
    UnknownLocale(String),

    /// The translation file for a registered locale could not be read
    #[error("Missing translation file for locale '{locale}' at {}", path.display())]
    MissingTranslationFile {
        locale: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The translation file exists but is not a flat JSON object of strings
    #[error("Malformed translation file for locale '{locale}' at {}", path.display())]
    MalformedTranslationFile {
        locale: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The locale registry violates one of its invariants
    #[error("Invalid locale registry: {0}")]
    InvalidRegistry(String),

    /// The template has no `</head>` to inject alternates before
    #[error("Document for locale '{locale}' has no </head> terminator")]
    MissingHeadTerminator { locale: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LocalizeError>;
