use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_STORE_PATH: &str = "ambisight-store.json";

/// Resolved runtime settings. The store path comes from `--store` or
/// `AMBISIGHT_STORE`; Postgres is only needed by the sync commands.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store_path: PathBuf,
    database_url: Option<String>,
}

impl Settings {
    pub fn new(store_path: PathBuf, database_url: Option<String>) -> Self {
        Self {
            store_path,
            database_url: database_url.filter(|url| !url.trim().is_empty()),
        }
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to sync with a Postgres instance")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_database_url_counts_as_missing() {
        let settings = Settings::new(PathBuf::from(DEFAULT_STORE_PATH), Some("  ".to_string()));
        assert!(settings.database_url().is_err());
    }

    #[test]
    fn database_url_is_returned_when_set() {
        let settings = Settings::new(
            PathBuf::from("/tmp/store.json"),
            Some("postgres://localhost/ambisight".to_string()),
        );
        assert_eq!(
            settings.database_url().unwrap(),
            "postgres://localhost/ambisight"
        );
        assert_eq!(settings.store_path, PathBuf::from("/tmp/store.json"));
    }
}
