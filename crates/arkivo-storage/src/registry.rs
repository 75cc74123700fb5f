use crate::bucket::Bucket;
use arkivo_core::{LibraryError, LibraryResult, MediaFile};
use std::collections::HashMap;
use std::sync::Arc;

/// Name-keyed lookup of configured buckets.
///
/// Built once at setup; the default bucket must be among the entries, which
/// is checked at construction so a misconfigured default fails at boot
/// instead of on the first anonymous import.
#[derive(Debug)]
pub struct BucketRegistry {
    buckets: HashMap<String, Arc<Bucket>>,
    default_bucket: String,
}

impl BucketRegistry {
    pub fn new(
        buckets: Vec<Arc<Bucket>>,
        default_bucket: impl Into<String>,
    ) -> LibraryResult<Self> {
        let default_bucket = default_bucket.into();
        let buckets: HashMap<String, Arc<Bucket>> = buckets
            .into_iter()
            .map(|bucket| (bucket.name().to_string(), bucket))
            .collect();

        if !buckets.contains_key(&default_bucket) {
            return Err(LibraryError::BucketNotFound(default_bucket));
        }

        Ok(BucketRegistry {
            buckets,
            default_bucket,
        })
    }

    pub fn get(&self, name: &str) -> LibraryResult<Arc<Bucket>> {
        self.buckets
            .get(name)
            .cloned()
            .ok_or_else(|| LibraryError::BucketNotFound(name.to_string()))
    }

    pub fn get_default(&self) -> LibraryResult<Arc<Bucket>> {
        self.get(&self.default_bucket)
    }

    /// Resolve the bucket a file claims to belong to.
    pub fn get_for_file(&self, file: &MediaFile) -> LibraryResult<Arc<Bucket>> {
        self.get(&file.bucket)
    }

    pub fn default_bucket_name(&self) -> &str {
        &self.default_bucket
    }

    /// All registered buckets, for startup validation sweeps.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Bucket>> {
        self.buckets.values()
    }
}
