use crate::{Error, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Manages input validation and unique output paths for previews
pub struct PathManager {
    default_output_dir: PathBuf,
    current_dir: PathBuf,
}

impl PathManager {
    /// Create new PathManager with default output directory
    pub fn new() -> Result<Self> {
        let home = directories::UserDirs::new().ok_or_else(|| {
            Error::InvalidPath(PathBuf::from("Could not determine home directory"))
        })?;

        let default_output_dir = home.home_dir().join("Pictures").join("boundpix");

        Ok(Self {
            default_output_dir,
            current_dir: std::env::current_dir()?,
        })
    }

    /// PathManager writing into `dir` instead of the user's pictures folder
    pub fn with_output_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            default_output_dir: dir.into(),
            current_dir: std::env::current_dir()?,
        })
    }

    /// Generate unique output path
    /// Format: YYYYMMDD_original-name_WxH_uniqueid.ext
    pub fn generate_unique_path(
        &self,
        original: &Path,
        dimensions: (u32, u32),
        new_extension: &str,
        custom_output: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let output_dir = if let Some(custom) = custom_output {
            if custom.is_dir() {
                custom
            } else {
                return Ok(custom); // User specified exact file path
            }
        } else {
            self.default_output_dir.clone()
        };

        std::fs::create_dir_all(&output_dir)?;

        let stem = original
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidPath(original.to_path_buf()))?;

        let timestamp = chrono::Local::now().format("%Y%m%d");
        let unique_id = Uuid::new_v4().simple().to_string();
        let unique_id_short = &unique_id[..8];

        let filename = format!(
            "{}_{}_{}x{}_{}.{}",
            timestamp, stem, dimensions.0, dimensions.1, unique_id_short, new_extension
        );

        Ok(output_dir.join(filename))
    }

    /// Validate input path exists and is readable
    pub fn validate_input(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }

        Ok(())
    }

    /// Expand `~` and environment variables, then anchor relative paths at the cwd
    pub fn resolve(&self, path_str: &str) -> Result<PathBuf> {
        let expanded =
            shellexpand::full(path_str).map_err(|_| Error::InvalidPath(PathBuf::from(path_str)))?;

        let path = PathBuf::from(expanded.as_ref());
        let absolute = if path.is_absolute() {
            path
        } else {
            self.current_dir.join(path)
        };

        tracing::debug!("Resolved '{}' → {:?}", path_str, absolute);
        Ok(absolute)
    }

    /// Resolve glob pattern for batch operations
    pub fn resolve_pattern(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let resolved_pattern = self.resolve(pattern)?;
        let pattern_str = resolved_pattern.to_string_lossy();

        tracing::debug!("Glob pattern: {}", pattern_str);

        let entries = glob::glob(&pattern_str)
            .map_err(|_| Error::InvalidPath(resolved_pattern.clone()))?;

        let mut matches = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => matches.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("Glob error: {}", e),
            }
        }

        matches.sort();
        Ok(matches)
    }

    /// Get default output directory
    pub fn default_output_dir(&self) -> &Path {
        &self.default_output_dir
    }
}
