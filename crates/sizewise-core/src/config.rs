//! Scan configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for scanning operations.
///
/// The defaults encode the engine's strategy thresholds; most callers only touch
/// `threads`.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Threads in the shared worker pool (0 = auto: 3 per CPU, capped at `max_workers`).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Logical CPU count used for worker sizing (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub cpu_count: usize,

    /// Directories with more entries than this are sampled by the classifier.
    #[builder(default = "100")]
    #[serde(default = "default_classify_min_entries")]
    pub classify_min_entries: usize,

    /// Number of entries sampled by the classifier.
    #[builder(default = "20")]
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Files strictly below this size count as small.
    #[builder(default = "32 * 1024")]
    #[serde(default = "default_small_file_threshold")]
    pub small_file_threshold: u64,

    /// A directory is small-file-heavy when strictly more than this share of samples is small.
    #[builder(default = "0.75")]
    #[serde(default = "default_small_file_ratio")]
    pub small_file_ratio: f64,

    /// Directories with fewer entries than this are never fanned out.
    #[builder(default = "5")]
    #[serde(default = "default_parallel_min_entries")]
    pub parallel_min_entries: usize,

    /// Below `parallel_depth`, directories with at most this many entries are scanned sequentially.
    #[builder(default = "20")]
    #[serde(default = "default_sequential_max_entries")]
    pub sequential_max_entries: usize,

    /// Directories shallower than this are always fanned out.
    #[builder(default = "2")]
    #[serde(default = "default_parallel_depth")]
    pub parallel_depth: usize,

    /// Directories with more entries than this use the reduced worker multiplier.
    #[builder(default = "1000")]
    #[serde(default = "default_large_fanout_entries")]
    pub large_fanout_entries: usize,

    /// Hard cap on workers for a single directory and on the auto-sized pool.
    #[builder(default = "24")]
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Files per batch in small-file-heavy directories.
    #[builder(default = "200")]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_classify_min_entries() -> usize {
    100
}

fn default_sample_size() -> usize {
    20
}

fn default_small_file_threshold() -> u64 {
    32 * 1024
}

fn default_small_file_ratio() -> f64 {
    0.75
}

fn default_parallel_min_entries() -> usize {
    5
}

fn default_sequential_max_entries() -> usize {
    20
}

fn default_parallel_depth() -> usize {
    2
}

fn default_large_fanout_entries() -> usize {
    1000
}

fn default_max_workers() -> usize {
    24
}

fn default_batch_size() -> usize {
    200
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.sample_size == Some(0) {
            return Err("Sample size must be at least 1".to_string());
        }
        if self.batch_size == Some(0) {
            return Err("Batch size must be at least 1".to_string());
        }
        if self.max_workers == Some(0) {
            return Err("Worker cap must be at least 1".to_string());
        }
        if let Some(ratio) = self.small_file_ratio {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(format!("Small file ratio must be in (0, 1], got {ratio}"));
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a config with default thresholds.
    pub fn new() -> Self {
        Self {
            threads: 0,
            cpu_count: 0,
            classify_min_entries: default_classify_min_entries(),
            sample_size: default_sample_size(),
            small_file_threshold: default_small_file_threshold(),
            small_file_ratio: default_small_file_ratio(),
            parallel_min_entries: default_parallel_min_entries(),
            sequential_max_entries: default_sequential_max_entries(),
            parallel_depth: default_parallel_depth(),
            large_fanout_entries: default_large_fanout_entries(),
            max_workers: default_max_workers(),
            batch_size: default_batch_size(),
        }
    }

    /// Logical CPU count, detected when not configured.
    pub fn cpus(&self) -> usize {
        match self.cpu_count {
            0 => num_cpus::get(),
            n => n,
        }
    }

    /// Size of the shared worker pool.
    pub fn pool_threads(&self) -> usize {
        match self.threads {
            0 => (self.cpus() * 3).min(self.max_workers).max(1),
            n => n,
        }
    }

    /// Workers used to fan out a directory with `entry_count` entries.
    pub fn worker_count(&self, entry_count: usize) -> usize {
        let multiplier = if entry_count > self.large_fanout_entries {
            2
        } else {
            3
        };
        (self.cpus() * multiplier).min(self.max_workers).max(1)
    }

    /// Concurrent batch workers in a small-file-heavy directory.
    pub fn batch_workers(&self) -> usize {
        (self.cpus() * 2).max(1)
    }

    /// Concurrent subdirectory scans in a small-file-heavy directory.
    pub fn batch_dir_workers(&self) -> usize {
        self.cpus().max(1)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .threads(4usize)
            .batch_size(50usize)
            .build()
            .unwrap();

        assert_eq!(config.threads, 4);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.sample_size, 20);
    }

    #[test]
    fn test_builder_matches_new() {
        let built = ScanConfig::builder().build().unwrap();
        assert_eq!(built, ScanConfig::default());
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        assert!(ScanConfig::builder().sample_size(0usize).build().is_err());
        assert!(ScanConfig::builder().batch_size(0usize).build().is_err());
        assert!(ScanConfig::builder().small_file_ratio(1.5).build().is_err());
        assert!(ScanConfig::builder().small_file_ratio(0.0).build().is_err());
    }

    #[test]
    fn test_worker_count() {
        let config = ScanConfig::builder().cpu_count(4usize).build().unwrap();
        assert_eq!(config.worker_count(50), 12);
        assert_eq!(config.worker_count(1000), 12);
        assert_eq!(config.worker_count(1001), 8);
        assert_eq!(config.batch_workers(), 8);
        assert_eq!(config.batch_dir_workers(), 4);

        let big = ScanConfig::builder().cpu_count(16usize).build().unwrap();
        assert_eq!(big.worker_count(50), 24);
        assert_eq!(big.worker_count(5000), 24);
        assert_eq!(big.pool_threads(), 24);
    }

    #[test]
    fn test_explicit_threads() {
        let config = ScanConfig::builder().threads(3usize).build().unwrap();
        assert_eq!(config.pool_threads(), 3);
    }

    #[test]
    fn test_serde_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"threads": 2}"#).unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.batch_size, 200);
        assert_eq!(config.small_file_threshold, 32 * 1024);
    }
}
