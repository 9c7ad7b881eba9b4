//! Vision/OCR provider trait for multimodal image analysis

use async_trait::async_trait;

use crate::error::Result;

/// Trait for image analysis with a hosted multimodal model
///
/// The provider receives raw image bytes and MIME-tags them itself (derived
/// from the filename); depending on the prompt the reply is free text (OCR
/// transcription) or text containing embedded JSON (finding extraction).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Analyze an image with the given instruction prompt
    async fn analyze_image(&self, prompt: &str, image: &[u8], filename: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
