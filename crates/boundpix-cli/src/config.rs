use anyhow::{Context, Result};
use boundpix_common::PathManager;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default output directory
    #[serde(default = "default_output_dir")]
    pub default_output_dir: PathBuf,

    /// Preview format; unset keeps the input's format
    #[serde(default)]
    pub output_format: Option<String>,

    /// Maximum total pixels of a decoded image
    #[serde(default = "default_pixel_limit")]
    pub pixel_limit: f64,

    /// Default short edge cap
    #[serde(default)]
    pub short_edge: Option<f64>,

    /// Default long edge cap
    #[serde(default)]
    pub long_edge: Option<f64>,

    /// Decode pixels inside the decode call instead of on first access
    #[serde(default)]
    pub eager_decode: bool,

    /// Resampling filter (nearest, triangle, catmullrom, gaussian, lanczos3)
    #[serde(default = "default_resize_filter")]
    pub resize_filter: String,

    /// Largest full-resolution decode buffer, in MB (0 = unlimited)
    #[serde(default = "default_max_decode_alloc_mb")]
    pub max_decode_alloc_mb: u64,

    /// Number of parallel jobs for batch operations
    #[serde(default = "default_jobs")]
    pub parallel_jobs: usize,

    /// Show progress bars
    #[serde(default = "default_progress")]
    pub show_progress: bool,

    /// Colored output
    #[serde(default = "default_color")]
    pub colored_output: bool,
}

fn default_output_dir() -> PathBuf {
    PathManager::new()
        .map(|manager| manager.default_output_dir().to_path_buf())
        .unwrap_or_else(|_| PathBuf::from("./output"))
}

fn default_pixel_limit() -> f64 {
    boundpix_common::size::DEFAULT_TOTAL_PIXEL_LIMIT
}

fn default_resize_filter() -> String {
    "catmullrom".to_string()
}

fn default_max_decode_alloc_mb() -> u64 {
    1024
}

fn default_jobs() -> usize {
    num_cpus::get()
}

fn default_progress() -> bool {
    true
}

fn default_color() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_output_dir: default_output_dir(),
            output_format: None,
            pixel_limit: default_pixel_limit(),
            short_edge: None,
            long_edge: None,
            eager_decode: false,
            resize_filter: default_resize_filter(),
            max_decode_alloc_mb: default_max_decode_alloc_mb(),
            parallel_jobs: default_jobs(),
            show_progress: default_progress(),
            colored_output: default_color(),
        }
    }
}

impl Config {
    /// Get config file path (XDG-compliant)
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = directories::ProjectDirs::from("", "", "boundpix")
            .context("Failed to determine config directory")?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path).context("Failed to read config file")?;

            let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

            tracing::debug!("Loaded config from {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default config at {:?}", config_path);
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        tracing::debug!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Reset to defaults
    pub fn reset() -> Result<()> {
        let config = Self::default();
        config.save()
    }

    /// Decode allocation ceiling in bytes; `None` when unlimited
    pub fn max_decode_alloc_bytes(&self) -> Option<u64> {
        (self.max_decode_alloc_mb > 0)
            .then(|| self.max_decode_alloc_mb.saturating_mul(1024 * 1024))
    }

    /// Update one key from its string form. `none` clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |value: &str| -> Result<Option<f64>> {
            if value.eq_ignore_ascii_case("none") {
                Ok(None)
            } else {
                Ok(Some(value.parse()?))
            }
        };

        match key {
            "default_output_dir" => self.default_output_dir = PathBuf::from(value),
            "output_format" => {
                self.output_format = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    boundpix_common::MediaFormat::from_extension(value)
                        .with_context(|| format!("Unsupported format: {}", value))?;
                    Some(value.to_lowercase())
                }
            }
            "pixel_limit" => {
                let limit: f64 = value.parse()?;
                boundpix_common::TotalPixelLimit::new(limit)
                    .with_context(|| format!("Pixel limit must be positive: {}", value))?;
                self.pixel_limit = limit;
            }
            "short_edge" => self.short_edge = optional(value)?,
            "long_edge" => self.long_edge = optional(value)?,
            "eager_decode" => self.eager_decode = value.parse()?,
            "resize_filter" => {
                boundpix_formats::resize::parse_filter(value)
                    .with_context(|| format!("Unknown resize filter: {}", value))?;
                self.resize_filter = value.to_lowercase();
            }
            "max_decode_alloc_mb" => self.max_decode_alloc_mb = value.parse()?,
            "parallel_jobs" => self.parallel_jobs = value.parse()?,
            "show_progress" => self.show_progress = value.parse()?,
            "colored_output" => self.colored_output = value.parse()?,
            _ => anyhow::bail!("Unknown config key: {}", key),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.show_progress);
        assert!(!config.eager_decode);
        assert_eq!(config.pixel_limit, 15_000_000.0);
        assert_eq!(config.resize_filter, "catmullrom");
        assert!(config.short_edge.is_none());
        if let Ok(manager) = PathManager::new() {
            assert_eq!(config.default_output_dir, manager.default_output_dir());
        }
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.long_edge = Some(2048.0);
        let toml = toml::to_string(&config).unwrap();

        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.long_edge, Some(2048.0));
        assert_eq!(parsed.short_edge, None);
        assert_eq!(config.resize_filter, parsed.resize_filter);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let parsed: Config = toml::from_str("eager_decode = true").unwrap();
        assert!(parsed.eager_decode);
        assert_eq!(parsed.max_decode_alloc_mb, 1024);
    }

    #[test]
    fn test_set_values() {
        let mut config = Config::default();
        config.set("short_edge", "800").unwrap();
        config.set("resize_filter", "Lanczos3").unwrap();
        config.set("output_format", "JPG").unwrap();
        assert_eq!(config.short_edge, Some(800.0));
        assert_eq!(config.resize_filter, "lanczos3");
        assert_eq!(config.output_format.as_deref(), Some("jpg"));

        config.set("short_edge", "none").unwrap();
        assert_eq!(config.short_edge, None);
    }

    #[test]
    fn test_max_decode_alloc_bytes() {
        let mut config = Config::default();
        assert_eq!(config.max_decode_alloc_bytes(), Some(1024 * 1024 * 1024));

        config.set("max_decode_alloc_mb", "0").unwrap();
        assert_eq!(config.max_decode_alloc_bytes(), None);

        config.set("max_decode_alloc_mb", &u64::MAX.to_string()).unwrap();
        assert_eq!(config.max_decode_alloc_bytes(), Some(u64::MAX));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("pixel_limit", "0").is_err());
        assert!(config.set("resize_filter", "bicubic-ish").is_err());
        assert!(config.set("output_format", "pdf").is_err());
        assert!(config.set("no_such_key", "1").is_err());
    }
}
