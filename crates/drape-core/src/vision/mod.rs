//! Vision provider integration: image upload, tagging and color extraction.
//!
//! The provider is reached through a two-step protocol: upload the image
//! once, then query tags and colors by the returned handle.

pub(crate) mod imagga;

pub use imagga::ImaggaProvider;

use async_trait::async_trait;

use crate::error::AnalyzeError;
use crate::types::{ColorProfile, TagSet, UploadHandle};
use crate::upload::StagedUpload;

/// Trait that all vision providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn VisionProvider>` for dynamic dispatch).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "Imagga").
    fn name(&self) -> &str;

    /// Upload the staged image and return the provider's handle for it.
    async fn upload(&self, image: &StagedUpload) -> Result<UploadHandle, AnalyzeError>;

    /// Fetch tags for a previously uploaded image.
    async fn tags(&self, handle: &UploadHandle) -> Result<TagSet, AnalyzeError>;

    /// Fetch the color profile for a previously uploaded image.
    async fn colors(&self, handle: &UploadHandle) -> Result<ColorProfile, AnalyzeError>;
}
