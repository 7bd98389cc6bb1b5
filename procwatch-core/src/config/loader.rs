use super::Config;
use std::path::{Path, PathBuf};

/// File names probed in every search path, in priority order.
const CONFIG_FILE_NAMES: &[&str] = &["procwatch.json", "config.json"];

/// Config loader with auto-discovery
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from("."), PathBuf::from("./config")],
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that only looks in the given directories.
    pub fn with_search_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Finds the first config file in the search paths, then loads and validates it.
    pub async fn load(&self) -> crate::Result<Config> {
        match self.discover() {
            Some(path) => self.load_file(&path).await,
            None => Err(crate::Error::Config(format!(
                "no {} found in {:?}",
                CONFIG_FILE_NAMES.join(" or "),
                self.search_paths
            ))),
        }
    }

    pub fn discover(&self) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
    }

    /// Load a specific config file
    pub async fn load_file(&self, path: &Path) -> crate::Result<Config> {
        tracing::debug!("Loading process manager config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            crate::Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Config::from_json(&content)?;
        config.validate()?;
        tracing::debug!("Config loaded successfully");
        Ok(config)
    }
}
