use std::{env, path::PathBuf, str::FromStr};

const BUFFER_SIZE: usize = 8 * 1024;
const SWEEP_INTERVAL: u64 = 60;

/// Where resource metadata lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataBackend {
    /// Process-local map, lost on restart.
    Memory,
    /// redb database file.
    Redb(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    pub metadata_backend: MetadataBackend,
    pub buffer_size: usize,
    pub sweep_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("blobs"),
            metadata_backend: MetadataBackend::Memory,
            buffer_size: BUFFER_SIZE,
            sweep_interval: SWEEP_INTERVAL,
        }
    }
}

impl Config {
    pub fn new(root_dir: impl Into<PathBuf>, metadata_backend: MetadataBackend) -> Self {
        Self { root_dir: root_dir.into(), metadata_backend, ..Default::default() }
    }

    /// Small buffer and a one second sweep so tests exercise chunking and housekeeping quickly.
    pub fn new_test(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            metadata_backend: MetadataBackend::Memory,
            buffer_size: 16,
            sweep_interval: 1,
        }
    }

    /// Reads `BLOBVAULT_*` variables, falling back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let root_dir = env::var_os("BLOBVAULT_ROOT").map(PathBuf::from).unwrap_or(defaults.root_dir);
        let metadata_backend = match env::var_os("BLOBVAULT_METADATA_DB") {
            Some(path) if !path.is_empty() => MetadataBackend::Redb(PathBuf::from(path)),
            _ => MetadataBackend::Memory,
        };

        Self {
            root_dir,
            metadata_backend,
            buffer_size: parse_var("BLOBVAULT_BUFFER_SIZE", defaults.buffer_size).max(1),
            sweep_interval: parse_var("BLOBVAULT_SWEEP_SECS", defaults.sweep_interval),
        }
    }
}

fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(%name, %raw, "Unparsable config value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_memory_backend() {
        let cfg = Config::default();
        assert_eq!(cfg.metadata_backend, MetadataBackend::Memory);
        assert_eq!(cfg.buffer_size, BUFFER_SIZE);
        assert_eq!(cfg.root_dir, PathBuf::from("blobs"));
    }

    #[test]
    fn new_keeps_remaining_defaults() {
        let cfg = Config::new("/tmp/vault", MetadataBackend::Redb("/tmp/meta.redb".into()));
        assert_eq!(cfg.root_dir, PathBuf::from("/tmp/vault"));
        assert_eq!(cfg.sweep_interval, SWEEP_INTERVAL);
    }

    #[test]
    fn parse_var_falls_back_on_garbage() {
        // name chosen so no other test touches it
        unsafe { env::set_var("BLOBVAULT_TEST_GARBAGE", "not-a-number") };
        assert_eq!(parse_var("BLOBVAULT_TEST_GARBAGE", 7usize), 7);
        unsafe { env::set_var("BLOBVAULT_TEST_GARBAGE", " 42 ") };
        assert_eq!(parse_var("BLOBVAULT_TEST_GARBAGE", 7usize), 42);
        unsafe { env::remove_var("BLOBVAULT_TEST_GARBAGE") };
    }
}
