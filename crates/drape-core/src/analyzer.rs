//! Upload-analysis orchestration.
//!
//! One staged upload goes through: vision upload, tags and colors fetched
//! concurrently, normalization, one recommendation call. The staged file is
//! released exactly once whichever way the flow ends.

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AnalyzeError;
use crate::llm::{parse_recommendations, LlmProvider, LlmProviderFactory, LlmRequest};
use crate::types::{AnalysisResult, StyleBrief};
use crate::upload::{LocalUploadStore, StagedUpload, UploadStore};
use crate::vision::{ImaggaProvider, VisionProvider};

/// Tunables for the analysis flow.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Request a JSON object from the language model
    pub json_mode: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { json_mode: true }
    }
}

/// The upload-analysis orchestrator.
///
/// Providers are optional so a service with missing credentials still
/// starts; every request then fails with `MisconfiguredService` before any
/// network I/O.
pub struct Analyzer {
    vision: Option<Arc<dyn VisionProvider>>,
    llm: Option<Arc<dyn LlmProvider>>,
    llm_label: String,
    store: Arc<dyn UploadStore>,
    options: AnalyzeOptions,
}

impl Analyzer {
    pub fn new(
        vision: Option<Arc<dyn VisionProvider>>,
        llm: Option<Arc<dyn LlmProvider>>,
        store: Arc<dyn UploadStore>,
    ) -> Self {
        let llm_label = llm
            .as_ref()
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| "Groq".to_string());
        Self {
            vision,
            llm,
            llm_label,
            store,
            options: AnalyzeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnalyzeOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the analyzer from config, resolving credentials once.
    pub fn from_config(config: &Config) -> Self {
        let vision = config.vision.credentials().map(|credentials| {
            Arc::new(ImaggaProvider::new(
                &config.vision.endpoint,
                credentials,
                Duration::from_millis(config.vision.timeout_ms),
            )) as Arc<dyn VisionProvider>
        });
        if vision.is_none() {
            tracing::warn!("Imagga credentials not set; /api/analyze will fail until configured");
        }

        let llm = match LlmProviderFactory::create(&config.llm) {
            Ok(provider) => Some(Arc::from(provider)),
            Err(e) => {
                tracing::warn!("{e}; /api/analyze will fail until configured");
                None
            }
        };

        let store = Arc::new(LocalUploadStore::new(config.upload_dir()));
        let label = match config.llm.provider.as_str() {
            "openai" => "OpenAI",
            _ => "Groq",
        };

        let mut analyzer = Self::new(vision, llm, store).with_options(AnalyzeOptions {
            json_mode: config.llm.json_mode,
        });
        analyzer.llm_label = label.to_string();
        analyzer
    }

    /// Where uploads are staged before analysis.
    pub fn store(&self) -> &Arc<dyn UploadStore> {
        &self.store
    }

    /// Whether every provider the flow needs has credentials.
    pub fn is_configured(&self) -> bool {
        self.vision.is_some() && self.llm.is_some()
    }

    /// Analyze one staged upload.
    ///
    /// Takes ownership of the upload and releases it exactly once: after
    /// success, after any error, and before resuming a panic.
    pub async fn analyze(&self, upload: StagedUpload) -> Result<AnalysisResult, AnalyzeError> {
        tracing::info!("Analyzing {}", upload.file_name());

        let outcome = AssertUnwindSafe(self.run(&upload)).catch_unwind().await;
        self.release(upload).await;

        let result = match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        if let Err(e) = &result {
            log_failure(e);
        }
        result
    }

    async fn run(&self, upload: &StagedUpload) -> Result<AnalysisResult, AnalyzeError> {
        let vision = self
            .vision
            .as_deref()
            .ok_or_else(|| AnalyzeError::misconfigured("Imagga"))?;
        let llm = self
            .llm
            .as_deref()
            .ok_or_else(|| AnalyzeError::misconfigured(&self.llm_label))?;

        let handle = vision.upload(upload).await?;
        tracing::debug!("{} accepted upload as {}", vision.name(), handle);

        // Both must succeed; a failure on either side drops the other result.
        let (tags, colors) = tokio::try_join!(vision.tags(&handle), vision.colors(&handle))?;
        tracing::debug!(
            "Received {} tags, {} dominant colors",
            tags.len(),
            colors.dominant_colors().len()
        );

        let brief = StyleBrief::from_vision(&tags, &colors);
        let request = LlmRequest::recommend(&brief, self.options.json_mode);
        let response = llm.complete(&request).await?;
        tracing::debug!(
            "{} answered in {}ms ({:?} tokens)",
            llm.name(),
            response.latency_ms,
            response.tokens_used
        );

        let recommendations = match parse_recommendations(response.text.as_deref()) {
            Ok(recommendations) => recommendations,
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), "{e}; returning no recommendations");
                Vec::new()
            }
        };

        Ok(AnalysisResult {
            tags,
            colors,
            recommendations,
        })
    }

    /// Best-effort removal of the staged file.
    async fn release(&self, upload: StagedUpload) {
        let path = upload.path().to_path_buf();
        if let Err(e) = self.store.remove(upload).await {
            tracing::warn!("Failed to remove staged upload {:?}: {e}", path);
        }
    }
}

fn log_failure(error: &AnalyzeError) {
    match error {
        AnalyzeError::UpstreamCallFailure {
            provider,
            status_code,
            body,
            ..
        } => {
            tracing::error!(
                kind = ?error.kind(),
                provider = %provider,
                status = ?status_code,
                "Image analysis failed: {error}"
            );
            if let Some(body) = body {
                tracing::error!("{provider} error payload: {body}");
            }
        }
        other => {
            tracing::error!(
                kind = ?other.kind(),
                provider = ?other.provider(),
                "Image analysis failed: {other}"
            );
        }
    }
}
