//! # Configuration
//!
//! Settings come from three places, later ones winning:
//! 1. Built-in defaults
//! 2. `zafra.toml` (or the file named by `--config`)
//! 3. Command-line flags and environment variables
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [storage]
//! backend = "redb"        # redb | file | memory
//! database = "zafra.redb"
//!
//! [http]
//! rate_limit = 100        # requests/second, 0 disables
//! cors_origins = "http://localhost:3000"
//! ```
//!
//! Environment: `ZAFRA_API_KEY`, `ZAFRA_RATE_LIMIT`, `ZAFRA_CORS_ORIGINS`.

use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use zafra_core::{Ledger, LedgerError};

/// Config file read when `--config` is not given. Its absence is fine.
pub const DEFAULT_CONFIG_FILE: &str = "zafra.toml";

/// Default request rate limit per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Where the ledger's slots live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// redb database file
    #[default]
    Redb,
    /// Directory of `<slot>.json` files
    File,
    /// Process memory only; nothing survives exit
    Memory,
}

impl Backend {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::File => "file",
            Self::Memory => "memory",
        }
    }

    /// Default database location for this backend.
    #[must_use]
    pub fn default_database(self) -> PathBuf {
        match self {
            Self::Redb => PathBuf::from("zafra.redb"),
            Self::File => PathBuf::from("zafra-data"),
            Self::Memory => PathBuf::new(),
        }
    }

    /// Open a ledger on this backend.
    pub fn open(self, database: &Path) -> Result<Ledger, LedgerError> {
        match self {
            Self::Redb => Ledger::with_redb(database),
            Self::File => Ledger::with_files(database),
            Self::Memory => Ok(Ledger::in_memory()),
        }
    }
}

// =============================================================================
// CONFIG FILE
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub backend: Option<Backend>,
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub rate_limit: Option<u32>,
    pub cors_origins: Option<String>,
}

/// Contents of `zafra.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub http: HttpSection,
}

impl ConfigFile {
    /// Parse config text.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        toml::from_str(raw)
            .map_err(|e| LedgerError::DeserializationError(format!("Invalid config: {}", e)))
    }

    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, `zafra.toml` in the working
    /// directory is used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, LedgerError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let raw = fs::read_to_string(&path).map_err(|e| {
            LedgerError::IoError(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&raw)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Storage settings after flags and file are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub backend: Backend,
    pub database: PathBuf,
}

impl StorageSettings {
    /// Merge flag values over the config file.
    #[must_use]
    pub fn resolve(
        file: &StorageSection,
        backend_flag: Option<Backend>,
        database_flag: Option<PathBuf>,
    ) -> Self {
        let backend = backend_flag.or(file.backend).unwrap_or_default();
        let database = database_flag
            .or_else(|| file.database.clone())
            .unwrap_or_else(|| backend.default_database());
        Self { backend, database }
    }

    /// Open the ledger these settings describe.
    pub fn open(&self) -> Result<Ledger, LedgerError> {
        self.backend.open(&self.database)
    }
}

/// HTTP security settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpSettings {
    /// Bearer token required on every route but `/health`, if set.
    pub api_key: Option<String>,
    /// Requests per second; 0 disables limiting.
    pub rate_limit: u32,
    /// Comma-separated allowed origins, `*` for any; localhost when unset.
    pub cors_origins: Option<String>,
}

impl HttpSettings {
    /// Merge environment variables over the config file.
    #[must_use]
    pub fn resolve(file: &HttpSection) -> Self {
        Self::resolve_with(file, |name| std::env::var(name).ok())
    }

    /// Merge values from `lookup` over the config file.
    pub fn resolve_with(file: &HttpSection, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup("ZAFRA_API_KEY").filter(|k| !k.is_empty());
        let rate_limit = lookup("ZAFRA_RATE_LIMIT")
            .and_then(|s| s.trim().parse().ok())
            .or(file.rate_limit)
            .unwrap_or(DEFAULT_RATE_LIMIT);
        let cors_origins = lookup("ZAFRA_CORS_ORIGINS").or_else(|| file.cors_origins.clone());
        Self {
            api_key,
            rate_limit,
            cors_origins,
        }
    }

    /// Open settings: no key, no rate limit, localhost CORS.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = ConfigFile::parse("").expect("parse");
        let storage = StorageSettings::resolve(&config.storage, None, None);
        assert_eq!(storage.backend, Backend::Redb);
        assert_eq!(storage.database, PathBuf::from("zafra.redb"));
    }

    #[test]
    fn file_values_apply() {
        let config = ConfigFile::parse(
            r#"
            [server]
            port = 9000

            [storage]
            backend = "file"
            database = "/var/lib/zafra"

            [http]
            rate_limit = 5
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.port, Some(9000));
        let storage = StorageSettings::resolve(&config.storage, None, None);
        assert_eq!(storage.backend, Backend::File);
        assert_eq!(storage.database, PathBuf::from("/var/lib/zafra"));
        assert_eq!(HttpSettings::resolve_with(&config.http, |_| None).rate_limit, 5);
    }

    #[test]
    fn flags_override_file() {
        let config = ConfigFile::parse("[storage]\nbackend = \"file\"\n").expect("parse");
        let storage = StorageSettings::resolve(
            &config.storage,
            Some(Backend::Memory),
            Some(PathBuf::from("x")),
        );
        assert_eq!(storage.backend, Backend::Memory);
        assert_eq!(storage.database, PathBuf::from("x"));
    }

    #[test]
    fn env_overrides_file() {
        let config = ConfigFile::parse("[http]\nrate_limit = 5\ncors_origins = \"a\"\n").expect("parse");
        let settings = HttpSettings::resolve_with(&config.http, |name| match name {
            "ZAFRA_RATE_LIMIT" => Some("0".into()),
            "ZAFRA_API_KEY" => Some("secret".into()),
            _ => None,
        });
        assert_eq!(settings.rate_limit, 0);
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.cors_origins.as_deref(), Some("a"));
    }

    #[test]
    fn empty_api_key_disables_auth() {
        let settings = HttpSettings::resolve_with(&HttpSection::default(), |name| {
            (name == "ZAFRA_API_KEY").then(String::new)
        });
        assert_eq!(settings.api_key, None);
        assert_eq!(settings.rate_limit, DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(ConfigFile::parse("[storage]\nbakend = \"redb\"\n").is_err());
    }
}
