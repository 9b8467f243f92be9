pub mod check;
pub mod export;
pub mod fix;
pub mod init;
pub mod normalize;
pub mod serve;
pub mod watch;

use std::path::{Path, PathBuf};

use navcase::config::{Config, base_path_from_config};

/// A loaded config and the directory relative paths in it resolve against.
pub struct Loaded {
    pub config: Config,
    pub base_path: PathBuf,
}

impl Loaded {
    pub async fn from_arg(config_file: &Path) -> Result<Self, anyhow::Error> {
        let config_path = if config_file.is_relative() {
            std::env::current_dir()?.join(config_file)
        } else {
            config_file.to_path_buf()
        };

        let config = Config::load_from_arg(Some(config_path.as_path())).await?;
        let base_path = base_path_from_config(&config_path);

        Ok(Self { config, base_path })
    }

    /// The site directory: an explicit path, or the configured output.
    pub fn site_dir(&self, path: Option<&Path>) -> PathBuf {
        match path {
            Some(path) => path.to_path_buf(),
            None => self.config.site_dir(&self.base_path),
        }
    }
}

/// Completes on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Fail early with a hint when the site has not been built yet.
pub fn ensure_site(site_dir: &Path) -> Result<(), anyhow::Error> {
    if !site_dir.exists() {
        return Err(anyhow::anyhow!(
            "Site not found: {path} (build the site first, or pass a path)",
            path = site_dir.display()
        ));
    }
    Ok(())
}
