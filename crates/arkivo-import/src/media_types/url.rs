use super::MediaTypeHandler;
use arkivo_core::{LibraryResult, Location, MediaFile, MediaResource};
use arkivo_storage::Bucket;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Handler for URL references: files whose content stays at an external
/// address instead of in a bucket's blob store.
pub struct UrlHandler;

#[async_trait]
impl MediaTypeHandler for UrlHandler {
    fn name(&self) -> &'static str {
        "url"
    }

    fn supports(&self, file: &MediaFile, resource: &MediaResource) -> bool {
        resource.is_url() || matches!(file.location, Some(Location::Url(_)))
    }

    async fn process(
        &self,
        file: &mut MediaFile,
        _resource: &MediaResource,
        _bucket: &Bucket,
    ) -> LibraryResult<()> {
        let Some(Location::Url(target)) = &file.location else {
            return Ok(());
        };

        match reqwest::Url::parse(target) {
            Ok(parsed) => {
                if let Some(host) = parsed.host_str() {
                    file.set_type_option("host", JsonValue::String(host.to_string()));
                }
            }
            Err(e) => {
                tracing::debug!(url = %target, error = %e, "URL reference has no parseable host");
            }
        }
        Ok(())
    }
}
