use std::path::{Path, PathBuf};

use crate::core::errors::{AuthError, Result};

/// Directory holding the config file, both per-project and in the home directory.
pub const CONFIG_DIR: &str = ".asc";
pub const CONFIG_FILE: &str = "config.json";

/// Every config file location that can hold credential profiles.
///
/// Precedence for the active file is override, then the nearest project-local
/// file, then the global file in the home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub override_path: Option<PathBuf>,
    /// Existing project-local config found by walking up from the working directory.
    pub local: Option<PathBuf>,
    pub global: Option<PathBuf>,
    /// Where a new project-local config would be written.
    pub local_target: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config paths from the current working directory and home directory.
    pub fn discover(override_path: Option<PathBuf>) -> Self {
        let cwd = std::env::current_dir().ok();
        let home = dirs::home_dir();
        Self::from_parts(override_path, cwd.as_deref(), home.as_deref())
    }

    /// Build config paths from explicit directories.
    pub fn from_parts(override_path: Option<PathBuf>, cwd: Option<&Path>, home: Option<&Path>) -> Self {
        let global = home.map(|h| h.join(CONFIG_DIR).join(CONFIG_FILE));
        let local = cwd.and_then(|dir| find_local_config(dir, home));
        let local_target = cwd.map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE));
        Self {
            override_path,
            local,
            global,
            local_target,
        }
    }

    /// The config file reads and writes go to by default.
    pub fn active(&self) -> Result<PathBuf> {
        self.override_path
            .clone()
            .or_else(|| self.local.clone())
            .or_else(|| self.global.clone())
            .ok_or_else(|| AuthError::InvalidConfig {
                path: PathBuf::from(CONFIG_DIR).join(CONFIG_FILE),
                detail: "could not determine the home directory; set ASC_CONFIG_PATH".into(),
            })
    }

    /// The global config file in the home directory.
    pub fn global_path(&self) -> Result<PathBuf> {
        self.global.clone().ok_or_else(|| AuthError::InvalidConfig {
            path: PathBuf::from("~").join(CONFIG_DIR).join(CONFIG_FILE),
            detail: "could not determine the home directory".into(),
        })
    }

    /// The project-local config file in the working directory.
    pub fn local_path(&self) -> Result<PathBuf> {
        self.local_target.clone().ok_or_else(|| AuthError::InvalidConfig {
            path: PathBuf::from(CONFIG_DIR).join(CONFIG_FILE),
            detail: "could not determine the working directory".into(),
        })
    }

    /// All distinct scopes in precedence order: override, local, global.
    pub fn scopes(&self) -> Vec<PathBuf> {
        let mut scopes: Vec<PathBuf> = Vec::new();
        for path in [&self.override_path, &self.local, &self.global]
            .into_iter()
            .flatten()
        {
            if !scopes.contains(path) {
                scopes.push(path.clone());
            }
        }
        scopes
    }
}

/// Walk up from `start` looking for `.asc/config.json`, stopping before the
/// home directory so the global file is never mistaken for a project file.
fn find_local_config(start: &Path, home: Option<&Path>) -> Option<PathBuf> {
    for dir in start.ancestors() {
        if home.is_some_and(|h| h == dir) {
            return None;
        }
        let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch_config(dir: &Path) -> PathBuf {
        let path = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn override_wins() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        touch_config(&work);

        let override_path = tmp.path().join("custom.json");
        let paths = ConfigPaths::from_parts(Some(override_path.clone()), Some(&work), Some(&home));
        assert_eq!(paths.active().unwrap(), override_path);
    }

    #[test]
    fn local_found_in_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let project = tmp.path().join("project");
        let nested = project.join("ios").join("App");
        std::fs::create_dir_all(&nested).unwrap();
        let local = touch_config(&project);

        let paths = ConfigPaths::from_parts(None, Some(&nested), Some(&home));
        assert_eq!(paths.local.as_deref(), Some(local.as_path()));
        assert_eq!(paths.active().unwrap(), local);
        assert_eq!(
            paths.local_path().unwrap(),
            nested.join(CONFIG_DIR).join(CONFIG_FILE)
        );
    }

    #[test]
    fn global_used_without_local() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();

        let paths = ConfigPaths::from_parts(None, Some(&work), Some(&home));
        assert_eq!(paths.local, None);
        assert_eq!(
            paths.active().unwrap(),
            home.join(CONFIG_DIR).join(CONFIG_FILE)
        );
    }

    #[test]
    fn walk_stops_at_home_directory() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let work = home.join("code").join("app");
        std::fs::create_dir_all(&work).unwrap();
        touch_config(&home);

        let paths = ConfigPaths::from_parts(None, Some(&work), Some(&home));
        assert_eq!(paths.local, None);
        assert_eq!(paths.scopes(), vec![home.join(CONFIG_DIR).join(CONFIG_FILE)]);
    }

    #[test]
    fn scopes_are_deduplicated_in_precedence_order() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        let local = touch_config(&work);
        let global = home.join(CONFIG_DIR).join(CONFIG_FILE);

        let paths = ConfigPaths::from_parts(Some(global.clone()), Some(&work), Some(&home));
        assert_eq!(paths.scopes(), vec![global, local]);
    }

    #[test]
    fn no_home_and_no_override_is_an_error() {
        let paths = ConfigPaths::from_parts(None, None, None);
        assert!(paths.active().is_err());
        assert!(paths.scopes().is_empty());
    }
}
