//! Upload pipeline configuration.
//!
//! Deserialized from TOML files via the `config` crate, with environment
//! variables prefixed `CHUNKPIPE_` taking precedence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UploadError;
use crate::result::UploadResult;

/// Configuration for the chunked upload pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Size of each chunk in bytes (default 5 MiB). Files at or below
    /// this size bypass chunking entirely.
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u64,
    /// Retries per chunk after the initial attempt (default 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-attempt timeout in milliseconds (default 60 000).
    #[serde(default = "default_chunk_timeout")]
    pub chunk_timeout_ms: u64,
    /// Number of chunks uploaded concurrently per batch (default 3).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between consecutive batches in milliseconds (default 500).
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,
    /// Base delay for exponential retry backoff in milliseconds
    /// (default 1000, doubling per retry).
    #[serde(default = "default_backoff_base")]
    pub retry_backoff_base_ms: u64,
    /// Hard ceiling on file size in bytes (default 500 MiB). Larger
    /// files are rejected before any network activity.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Optional aggregate time budget for the whole task in
    /// milliseconds. Disabled when absent.
    #[serde(default)]
    pub task_timeout_ms: Option<u64>,
    /// MIME type prefixes accepted for upload. Empty means any type
    /// is accepted.
    #[serde(default)]
    pub allowed_mime_prefixes: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
            max_retries: default_max_retries(),
            chunk_timeout_ms: default_chunk_timeout(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay(),
            retry_backoff_base_ms: default_backoff_base(),
            max_file_size_bytes: default_max_file_size(),
            task_timeout_ms: None,
            allowed_mime_prefixes: Vec::new(),
        }
    }
}

impl UploadConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific
    /// overlay and environment variables prefixed with `CHUNKPIPE_`.
    /// Missing files fall back to field defaults.
    pub fn load(env: &str) -> UploadResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHUNKPIPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can actually drive a pipeline.
    pub fn validate(&self) -> UploadResult<()> {
        if self.chunk_size_bytes == 0 {
            return Err(UploadError::InvalidChunkSize {
                chunk_size: self.chunk_size_bytes,
            });
        }
        if self.batch_size == 0 {
            return Err(UploadError::InvalidBatchSize {
                batch_size: self.batch_size,
            });
        }
        Ok(())
    }

    /// Per-attempt timeout as a [`Duration`].
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_millis(self.chunk_timeout_ms)
    }

    /// Pause between batches as a [`Duration`].
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Backoff delay before retry `attempt` (1-based): the base delay
    /// doubled for every retry after the first.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        Duration::from_millis(self.retry_backoff_base_ms.saturating_mul(1u64 << exponent))
    }

    /// Whether a MIME type is acceptable under the configured allow-list.
    pub fn is_mime_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_prefixes.is_empty()
            || self
                .allowed_mime_prefixes
                .iter()
                .any(|prefix| mime_type.starts_with(prefix.as_str()))
    }
}

fn default_chunk_size() -> u64 {
    5 * 1024 * 1024 // 5 MiB
}

fn default_max_retries() -> u32 {
    3
}

fn default_chunk_timeout() -> u64 {
    60_000
}

fn default_batch_size() -> usize {
    3
}

fn default_batch_delay() -> u64 {
    500
}

fn default_backoff_base() -> u64 {
    1_000
}

fn default_max_file_size() -> u64 {
    500 * 1024 * 1024 // 500 MiB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UploadConfig::default();
        assert_eq!(config.chunk_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.chunk_timeout_ms, 60_000);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.batch_delay_ms, 500);
        assert_eq!(config.retry_backoff_base_ms, 1_000);
        assert_eq!(config.max_file_size_bytes, 500 * 1024 * 1024);
        assert!(config.task_timeout_ms.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = UploadConfig {
            chunk_size_bytes: 0,
            ..UploadConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(UploadError::InvalidChunkSize { chunk_size: 0 })
        ));
    }

    #[test]
    fn test_backoff_doubles_per_retry() {
        let config = UploadConfig::default();
        assert_eq!(config.backoff_delay(1), Duration::from_millis(1_000));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(2_000));
        assert_eq!(config.backoff_delay(3), Duration::from_millis(4_000));
    }

    #[test]
    fn test_mime_allow_list() {
        let open = UploadConfig::default();
        assert!(open.is_mime_allowed("application/zip"));

        let restricted = UploadConfig {
            allowed_mime_prefixes: vec!["image/".to_string(), "video/".to_string()],
            ..UploadConfig::default()
        };
        assert!(restricted.is_mime_allowed("image/png"));
        assert!(restricted.is_mime_allowed("video/mp4"));
        assert!(!restricted.is_mime_allowed("application/zip"));
    }

    #[test]
    fn test_partial_toml_uses_field_defaults() {
        let config: UploadConfig =
            toml_from_str("chunk_size_bytes = 1048576").expect("partial config should parse");
        assert_eq!(config.chunk_size_bytes, 1024 * 1024);
        assert_eq!(config.batch_size, 3);
    }

    fn toml_from_str(raw: &str) -> Result<UploadConfig, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
