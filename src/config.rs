//! Configuration types for a document analysis run.
//!
//! All analysis behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across calls, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A long positional constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::AnalyzeError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default candidate model chain, tried in order.
///
/// Presently a single entry; the fallback loop in
/// [`crate::pipeline::llm`] iterates whatever list is configured, so
/// growing this to several models requires no code change.
pub const DEFAULT_MODELS: &[&str] = &["gemini-2.0-flash"];

/// Default proxy endpoint the analysis client posts prompts to.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8787/api/gemini";

/// The kind of analysis to run on the document.
///
/// Selects both the prompt template sent to the model and the title of the
/// exported report. Unrecognised tags fall back to [`AnalysisType::General`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    /// Full general analysis (default).
    #[default]
    General,
    /// Concise executive summary.
    Summary,
    /// Key-point extraction.
    Keypoints,
    /// Generated questions and answers.
    Qa,
}

impl AnalysisType {
    /// Every analysis type, in UI order.
    pub const ALL: [AnalysisType; 4] = [
        AnalysisType::General,
        AnalysisType::Summary,
        AnalysisType::Keypoints,
        AnalysisType::Qa,
    ];

    /// The short tag used in CLI flags, report filenames, and serialisation.
    pub fn tag(&self) -> &'static str {
        match self {
            AnalysisType::General => "general",
            AnalysisType::Summary => "summary",
            AnalysisType::Keypoints => "keypoints",
            AnalysisType::Qa => "qa",
        }
    }

    /// Parse a tag, falling back to `General` for anything unrecognised.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "summary" => AnalysisType::Summary,
            "keypoints" => AnalysisType::Keypoints,
            "qa" => AnalysisType::Qa,
            _ => AnalysisType::General,
        }
    }

    /// The all-caps title printed at the top of the exported report.
    pub fn report_title(&self) -> &'static str {
        match self {
            AnalysisType::General => "ANÁLISIS GENERAL DE DOCUMENTO",
            AnalysisType::Summary => "RESUMEN EJECUTIVO",
            AnalysisType::Keypoints => "PUNTOS CLAVE DEL DOCUMENTO",
            AnalysisType::Qa => "PREGUNTAS Y RESPUESTAS",
        }
    }

    /// Human-readable name used in the report metadata block.
    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisType::General => "Análisis General",
            AnalysisType::Summary => "Resumen Ejecutivo",
            AnalysisType::Keypoints => "Puntos Clave",
            AnalysisType::Qa => "Preguntas y Respuestas",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Configuration for a document analysis.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2report::{AnalysisConfig, AnalysisType};
///
/// let config = AnalysisConfig::builder()
///     .api_key("AIza...")
///     .analysis_type(AnalysisType::Summary)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Gemini API key, supplied per run by the user.
    ///
    /// Sent once per model attempt in the request body and discarded.
    /// Never written to disk and never logged — the custom `Debug` impl
    /// redacts it.
    pub api_key: String,

    /// Ordered candidate model list. Default: [`DEFAULT_MODELS`].
    ///
    /// The analysis client tries each in sequence and returns the first
    /// well-formed answer. This is a linear fallback chain, not a
    /// retry-with-backoff scheme: each candidate gets exactly one request.
    pub models: Vec<String>,

    /// Which analysis to run. Default: [`AnalysisType::General`].
    pub analysis_type: AnalysisType,

    /// Proxy endpoint URL the prompt is posted to. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Maximum number of document characters interpolated into the prompt.
    /// Default: 30 000.
    ///
    /// Text beyond the cap is dropped and the fixed truncation marker is
    /// appended, keeping prompts inside the model's practical context budget.
    pub prompt_char_limit: usize,

    /// Per-request timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Optional progress callback receiving phase events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            analysis_type: AnalysisType::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            prompt_char_limit: crate::prompts::PROMPT_CHAR_LIMIT,
            api_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("models", &self.models)
            .field("analysis_type", &self.analysis_type)
            .field("endpoint", &self.endpoint)
            .field("prompt_char_limit", &self.prompt_char_limit)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AnalysisProgressCallback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into().trim().to_string();
        self
    }

    /// Replace the candidate list with a single model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.models = vec![model.into()];
        self
    }

    /// Replace the whole candidate list (tried in order).
    pub fn models(mut self, models: Vec<String>) -> Self {
        self.config.models = models;
        self
    }

    pub fn analysis_type(mut self, t: AnalysisType) -> Self {
        self.config.analysis_type = t;
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn prompt_char_limit(mut self, n: usize) -> Self {
        self.config.prompt_char_limit = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, AnalyzeError> {
        let c = &self.config;
        if c.models.is_empty() || c.models.iter().any(|m| m.trim().is_empty()) {
            return Err(AnalyzeError::InvalidConfig(
                "The candidate model list must contain at least one non-empty model id".into(),
            ));
        }
        if c.endpoint.trim().is_empty() {
            return Err(AnalyzeError::InvalidConfig(
                "The proxy endpoint URL must not be empty".into(),
            ));
        }
        if c.prompt_char_limit < 100 {
            return Err(AnalyzeError::InvalidConfig(format!(
                "prompt_char_limit must be ≥ 100, got {}",
                c.prompt_char_limit
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_falls_back_to_general() {
        assert_eq!(AnalysisType::from_tag("sentiment"), AnalysisType::General);
        assert_eq!(AnalysisType::from_tag(""), AnalysisType::General);
        assert_eq!(AnalysisType::from_tag("qa"), AnalysisType::Qa);
    }

    #[test]
    fn default_config_has_one_candidate() {
        let c = AnalysisConfig::default();
        assert_eq!(c.models, vec!["gemini-2.0-flash".to_string()]);
        assert_eq!(c.prompt_char_limit, 30_000);
    }

    #[test]
    fn builder_rejects_empty_model_list() {
        let err = AnalysisConfig::builder().models(vec![]).build();
        assert!(matches!(err, Err(AnalyzeError::InvalidConfig(_))));
    }

    #[test]
    fn debug_never_prints_the_key() {
        let c = AnalysisConfig::builder().api_key("AIza-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("AIza-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn api_key_is_trimmed() {
        let c = AnalysisConfig::builder().api_key("  key  ").build().unwrap();
        assert_eq!(c.api_key, "key");
    }
}
