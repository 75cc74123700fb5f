//! Configuration module
//!
//! This module provides the environment-driven configuration for the media
//! library: which storage and metadata backends to use, where they live, and
//! the bucket definitions (size bounds plus ordered media-type names).
//! Bucket definitions arrive as a JSON array in `ARKIVO_BUCKETS`, e.g.
//!
//! ```text
//! ARKIVO_BUCKETS='[{"name":"images","max_size":10485760,"media_types":["image","other"]}]'
//! ```

use std::env;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::DEFAULT_BUCKET;
use crate::storage_types::StorageBackend;

const DEFAULT_MIN_FILE_SIZE: u64 = 0;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 100;

fn default_min_size() -> u64 {
    DEFAULT_MIN_FILE_SIZE
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024
}

/// One bucket definition: size bounds in bytes (inclusive) and the ordered
/// media-type names consulted during classification.
#[derive(Clone, Debug, Deserialize)]
pub struct BucketConfig {
    pub name: String,
    #[serde(default = "default_min_size")]
    pub min_size: u64,
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    #[serde(default)]
    pub media_types: Vec<String>,
}

impl BucketConfig {
    pub fn named(name: impl Into<String>) -> Self {
        BucketConfig {
            name: name.into(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            media_types: Vec::new(),
        }
    }
}

/// Which metadata store backs the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBackend {
    Postgres,
    Memory,
}

impl FromStr for MetadataBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(MetadataBackend::Postgres),
            "memory" => Ok(MetadataBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid metadata backend: {}", s)),
        }
    }
}

/// Media library configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub metadata_backend: MetadataBackend,
    pub storage_backend: StorageBackend,
    pub storage_root: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub default_bucket: String,
    pub buckets: Vec<BucketConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let metadata_backend = match env::var("METADATA_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) if database_url.is_some() => MetadataBackend::Postgres,
            Err(_) => MetadataBackend::Memory,
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse()?;

        let default_bucket =
            env::var("DEFAULT_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());

        let mut buckets = match env::var("ARKIVO_BUCKETS") {
            Ok(json) => parse_buckets(&json)?,
            Err(_) => Vec::new(),
        };
        if !buckets.iter().any(|b| b.name == default_bucket) {
            buckets.push(BucketConfig::named(default_bucket.clone()));
        }

        let config = Config {
            database_url,
            metadata_backend,
            storage_backend,
            storage_root: env::var("STORAGE_ROOT").ok().filter(|s| !s.is_empty()),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            default_bucket,
            buckets,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for bucket in &self.buckets {
            if !is_valid_bucket_name(&bucket.name) {
                return Err(anyhow::anyhow!(
                    "Invalid bucket name '{}': use lowercase letters, digits, '-' and '_'",
                    bucket.name
                ));
            }
            if bucket.min_size > bucket.max_size {
                return Err(anyhow::anyhow!(
                    "Bucket '{}' has min_size {} greater than max_size {}",
                    bucket.name,
                    bucket.min_size,
                    bucket.max_size
                ));
            }
        }

        let mut names: Vec<&str> = self.buckets.iter().map(|b| b.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.buckets.len() {
            return Err(anyhow::anyhow!("Duplicate bucket names in configuration"));
        }

        if !self.buckets.iter().any(|b| b.name == self.default_bucket) {
            return Err(anyhow::anyhow!(
                "Default bucket '{}' has no definition",
                self.default_bucket
            ));
        }

        if self.metadata_backend == MetadataBackend::Postgres && self.database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be set when using the postgres metadata backend"
            ));
        }

        match self.storage_backend {
            StorageBackend::Local => {
                if self.storage_root.is_none() {
                    return Err(anyhow::anyhow!(
                        "STORAGE_ROOT must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }

    pub fn bucket(&self, name: &str) -> Option<&BucketConfig> {
        self.buckets.iter().find(|b| b.name == name)
    }
}

/// Parse the `ARKIVO_BUCKETS` JSON array.
pub fn parse_buckets(json: &str) -> Result<Vec<BucketConfig>, anyhow::Error> {
    serde_json::from_str(json)
        .map_err(|e| anyhow::anyhow!("ARKIVO_BUCKETS is not a valid bucket list: {}", e))
}

fn is_valid_bucket_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
