//! Interactive session state for a host UI.
//!
//! [`AnalysisSession`] owns the mutable state a front end needs: the
//! selected document, the credential, the chosen analysis type, the current
//! phase, and the latest result. It enforces the phase transitions so a host
//! can bind buttons directly to [`can_analyze`](AnalysisSession::can_analyze)
//! and [`can_export`](AnalysisSession::can_export) without duplicating the
//! rules.
//!
//! The credential lives only in this struct for the lifetime of the session;
//! it is never serialised, never logged, and leaves the process only inside
//! proxy request bodies.

use crate::config::{AnalysisConfig, AnalysisType, DEFAULT_ENDPOINT, DEFAULT_MODELS};
use crate::error::AnalyzeError;
use crate::output::AnalysisOutput;
use crate::pipeline::input::Document;
use crate::pipeline::report;
use tracing::info;

/// The phase the session is in.
///
/// `Error` and `Success` are mutually exclusive; entering one clears the
/// message of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing running, no result yet.
    #[default]
    Idle,
    /// An analysis is in flight; a second one cannot start.
    Loading,
    /// The last analysis completed and its result is available.
    Success,
    /// The last operation failed; see the error message.
    Error,
}

/// Mutable state for one interactive analysis session.
pub struct AnalysisSession {
    state: SessionState,
    document: Option<Document>,
    api_key: String,
    analysis_type: AnalysisType,
    endpoint: String,
    models: Vec<String>,
    result: Option<AnalysisOutput>,
    status_message: Option<String>,
    error_message: Option<String>,
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("state", &self.state)
            .field("document", &self.document.as_ref().map(|d| &d.name))
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("analysis_type", &self.analysis_type)
            .field("endpoint", &self.endpoint)
            .field("models", &self.models)
            .field("has_result", &self.result.is_some())
            .finish()
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            document: None,
            api_key: String::new(),
            analysis_type: AnalysisType::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            result: None,
            status_message: None,
            error_message: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisOutput> {
        self.result.as_ref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Validate and accept a document. A rejected file leaves any previously
    /// accepted document in place and moves the session to `Error`.
    pub fn set_document_bytes(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<(), AnalyzeError> {
        match Document::from_bytes(name, bytes) {
            Ok(doc) => {
                info!("Document '{}' accepted ({} bytes)", doc.name, doc.bytes.len());
                self.set_status(format!("Documento cargado: {}", doc.name));
                self.document = Some(doc);
                self.result = None;
                self.state = SessionState::Idle;
                Ok(())
            }
            Err(e) => {
                self.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Store the credential for this session. Whitespace is trimmed; an
    /// empty value disables analysis but is not an error.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.api_key = key.into().trim().to_string();
    }

    pub fn set_analysis_type(&mut self, t: AnalysisType) {
        self.analysis_type = t;
    }

    /// Override the proxy endpoint (defaults to [`DEFAULT_ENDPOINT`]).
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    /// Override the candidate model chain (defaults to [`DEFAULT_MODELS`]).
    pub fn set_models(&mut self, models: Vec<String>) {
        self.models = models;
    }

    /// Analysis needs a document, a credential, and no run in flight.
    pub fn can_analyze(&self) -> bool {
        self.document.is_some() && !self.api_key.is_empty() && self.state != SessionState::Loading
    }

    /// Export needs a retained result from a successful run.
    pub fn can_export(&self) -> bool {
        self.result.is_some() && self.state == SessionState::Success
    }

    /// Run the analysis pipeline on the selected document.
    ///
    /// Moves through `Loading` and lands on `Success` or `Error`. On failure
    /// the previous result is discarded; the session can retry immediately.
    pub async fn analyze(&mut self) -> Result<&AnalysisOutput, AnalyzeError> {
        if self.state == SessionState::Loading {
            return Err(AnalyzeError::AnalysisInProgress);
        }
        if self.api_key.is_empty() {
            let e = AnalyzeError::MissingApiKey;
            self.set_error(e.to_string());
            return Err(e);
        }
        let Some(document) = self.document.clone() else {
            let e = AnalyzeError::MissingDocument;
            self.set_error(e.to_string());
            return Err(e);
        };

        let config = AnalysisConfig::builder()
            .api_key(self.api_key.clone())
            .models(self.models.clone())
            .analysis_type(self.analysis_type)
            .endpoint(self.endpoint.clone())
            .build()?;

        self.state = SessionState::Loading;
        match crate::analyze::analyze(&document, &config).await {
            Ok(output) => {
                self.state = SessionState::Success;
                self.set_status("Análisis completado correctamente".to_string());
                Ok(self.result.insert(output))
            }
            Err(e) => {
                self.result = None;
                self.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Render the retained result as a PDF report.
    ///
    /// Does not change the session state; export can be repeated.
    pub fn export_report(&self) -> Result<(Vec<u8>, String), AnalyzeError> {
        let Some(ref output) = self.result else {
            return Err(AnalyzeError::NoAnalysisResult);
        };
        if self.state != SessionState::Success {
            return Err(AnalyzeError::NoAnalysisResult);
        }
        let bytes = report::render_report(output)?;
        Ok((bytes, report::report_filename(output)))
    }

    fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
        self.state = SessionState::Error;
    }
}
