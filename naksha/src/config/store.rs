//! Store configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Environment variable that overrides [`StoreSection::path`].
pub const DB_PATH_ENV: &str = "DB_PATH";

/// Pose-graph store settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreSection {
    /// SQLite store path
    #[serde(default = "defaults::store_path")]
    pub path: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: defaults::store_path(),
        }
    }
}

impl StoreSection {
    /// Store path, with a non-empty `DB_PATH` taking priority.
    pub fn resolved_path(&self) -> PathBuf {
        self.resolve_with(std::env::var(DB_PATH_ENV).ok())
    }

    fn resolve_with(&self, env_value: Option<String>) -> PathBuf {
        match env_value {
            Some(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => PathBuf::from(&self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override() {
        let section = StoreSection {
            path: "a.db".to_string(),
        };
        assert_eq!(section.resolve_with(None), PathBuf::from("a.db"));
        assert_eq!(section.resolve_with(Some("  ".into())), PathBuf::from("a.db"));
        assert_eq!(
            section.resolve_with(Some("/data/b.db".into())),
            PathBuf::from("/data/b.db")
        );
    }
}
