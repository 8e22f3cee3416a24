mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    parse_config(&content).with_context(|| format!("Failed to load config file: {:?}", path))
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content).context("Failed to parse config")?;

    prepare(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    if let Some(path) = find_default_config() {
        return load_config(&path);
    }

    let mut config = Config::default();
    prepare(&mut config);
    Ok(config)
}

/// First existing file among the default config locations
pub fn find_default_config() -> Option<PathBuf> {
    let default_paths = [
        "./vlib.toml",
        "~/.config/vlib/config.toml",
        "/etc/vlib/config.toml",
    ];

    default_paths
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

fn prepare(config: &mut Config) {
    config.library.roots = config
        .library
        .roots
        .iter()
        .map(|root| PathBuf::from(shellexpand::tilde(&root.to_string_lossy()).as_ref()))
        .collect();
    config.library.extensions =
        vlib_common::paths::normalize_extensions(&config.library.extensions);
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.streaming.chunk_size == 0 {
        anyhow::bail!("Streaming chunk size cannot be 0");
    }

    if config.library.extensions.is_empty() {
        anyhow::bail!("Library extension list cannot be empty");
    }

    // Missing roots are not fatal: the scanner skips them on every pass.
    for root in &config.library.roots {
        if !root.is_dir() {
            tracing::warn!("Library root does not exist or is not a directory: {:?}", root);
        }
    }

    let metadata = &config.metadata;
    if metadata.enabled && (metadata.name_url.is_empty() || metadata.ids_url.is_empty()) {
        anyhow::bail!("Metadata lookup is enabled but name_url or ids_url is missing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.streaming.chunk_size, 1024 * 1024);
        assert!(config.library.extensions.contains(&"mkv".to_string()));
        assert!(config.library.scan_on_startup);
        assert!(!config.metadata.enabled);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_extensions_normalized() {
        let config = parse_config(
            r#"
            [library]
            roots = ["/srv/videos"]
            extensions = [".MP4", "mkv", "mp4"]
            "#,
        )
        .unwrap();
        assert_eq!(config.library.extensions, vec!["mp4", "mkv"]);
        assert_eq!(config.library.roots, vec![PathBuf::from("/srv/videos")]);
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let err = parse_config("[streaming]\nchunk_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("chunk size"));
    }

    #[test]
    fn test_rejects_empty_extensions() {
        assert!(parse_config("[library]\nextensions = []\n").is_err());
    }

    #[test]
    fn test_rejects_metadata_without_urls() {
        assert!(parse_config("[metadata]\nenabled = true\n").is_err());
    }

    #[test]
    fn test_lookup_timeout_covers_both_requests() {
        let config = parse_config("[metadata]\ntimeout_secs = 7\n").unwrap();
        assert_eq!(config.metadata.request_timeout(), Duration::from_secs(7));
        assert_eq!(config.metadata.lookup_timeout(), Duration::from_secs(14));

        let config = parse_config("[metadata]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(config.metadata.lookup_timeout(), Duration::from_secs(2));

        assert_eq!(
            Config::default().metadata.lookup_timeout(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_missing_root_is_not_fatal() {
        let config = parse_config("[library]\nroots = [\"/definitely/not/here\"]\n").unwrap();
        assert_eq!(config.library.roots.len(), 1);
    }
}
