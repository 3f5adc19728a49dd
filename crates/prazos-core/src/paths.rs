use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PRAZOS_DIR: &str = ".prazos";
pub const CONFIG_FILE: &str = ".prazos/config.yaml";
pub const DEFAULT_DATABASE: &str = ".prazos/prazos.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn prazos_dir(root: &Path) -> PathBuf {
    root.join(PRAZOS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the database path from config. Relative paths are taken from `root`.
pub fn database_path(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_database_is_joined_to_root() {
        let root = Path::new("/srv/cases");
        assert_eq!(
            database_path(root, Path::new(DEFAULT_DATABASE)),
            PathBuf::from("/srv/cases/.prazos/prazos.redb")
        );
    }

    #[test]
    fn absolute_database_is_kept() {
        let root = Path::new("/srv/cases");
        assert_eq!(
            database_path(root, Path::new("/var/lib/prazos.redb")),
            PathBuf::from("/var/lib/prazos.redb")
        );
    }
}
