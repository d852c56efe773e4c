//! Predictor form controller.
//!
//! Owns the form for one editing session and walks an explicit state
//! machine:
//!
//! ```text
//! LoadingMetadata ──ok──▶ Ready ──submit──▶ Predicting ──ok──▶ ResultShown
//!        │                  ▲                    │                 │
//!        └─err─▶ MetadataFailed                  └──err──▶ ErrorShown
//!                   │  (retry)                     (both resubmit ─▶ Predicting)
//!                   └──────────▶ LoadingMetadata
//! ```
//!
//! Any state can move to `Disposed`, after which late completions are
//! dropped.
//!
//! # Overlapping submissions
//!
//! Each submission takes a fresh [`SubmissionTicket`]. Only the completion
//! carrying the most recent ticket is applied; anything older is reported as
//! [`Completion::Stale`] and discarded, so a slow early response can never
//! overwrite a later one.

pub mod form;

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::api::{ApiError, MetadataResponse, PredictionRequest, PredictionResponse, PriceApi};
use crate::config::schema::PredictorConfig;

pub use form::{FormError, FormField, apply_edit};

/// Shown when the metadata bootstrap fails.
pub const METADATA_FAULT_MESSAGE: &str =
    "Market Intelligence Link Fault. Ensure ML backend is active.";

/// Shown when a failed prediction has no message of its own.
pub const PREDICT_ERROR_FALLBACK: &str = "An error occurred during market analysis.";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Identifies one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SubmissionTicket(u64);

/// The form's current state. Exactly one of these holds at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    /// Waiting for metadata; the form cannot be edited yet.
    LoadingMetadata,
    /// Metadata could not be loaded. Stays here until [`PredictorForm::retry_metadata`].
    MetadataFailed { message: String },
    /// Editable, nothing submitted yet.
    Ready,
    /// A prediction is in flight.
    Predicting { ticket: SubmissionTicket },
    /// The latest prediction succeeded.
    ResultShown { result: PredictionResponse },
    /// The latest prediction failed; the form stays editable.
    ErrorShown { message: String },
    /// The controller was torn down.
    Disposed,
}

impl FormState {
    /// Stable tag used by the web UI and in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadingMetadata => "loading-metadata",
            Self::MetadataFailed { .. } => "metadata-failed",
            Self::Ready => "ready",
            Self::Predicting { .. } => "predicting",
            Self::ResultShown { .. } => "result-shown",
            Self::ErrorShown { .. } => "error-shown",
            Self::Disposed => "disposed",
        }
    }

    /// Whether field edits and submissions are accepted.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Predicting { .. } | Self::ResultShown { .. } | Self::ErrorShown { .. }
        )
    }
}

/// What happened to a completed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome became the visible state.
    Applied,
    /// A newer submission superseded this one; the outcome was dropped.
    Stale,
    /// The controller was disposed; the outcome was dropped.
    Disposed,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Controller for the price predictor form.
#[derive(Debug)]
pub struct PredictorForm {
    state: FormState,
    request: PredictionRequest,
    metadata: Option<MetadataResponse>,
    reveal_delay: Duration,
    last_ticket: u64,
    submitted_at: Option<Instant>,
}

impl PredictorForm {
    /// A fresh form in `LoadingMetadata` with default field values.
    pub fn new(reveal_delay: Duration) -> Self {
        Self {
            state: FormState::LoadingMetadata,
            request: PredictionRequest::default(),
            metadata: None,
            reveal_delay,
            last_ticket: 0,
            submitted_at: None,
        }
    }

    pub fn from_config(config: &PredictorConfig) -> Self {
        Self::new(Duration::from_millis(config.reveal_delay_ms))
    }

    // -- Accessors --

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// The request that the next submit will send.
    pub fn request(&self) -> &PredictionRequest {
        &self.request
    }

    /// Location choices; empty until metadata has loaded.
    pub fn locations(&self) -> &[String] {
        self.metadata
            .as_ref()
            .map(|m| m.locations.as_slice())
            .unwrap_or_default()
    }

    /// BHK choices from metadata, or the standard 1–4 before it loads.
    pub fn bhk_options(&self) -> Vec<u8> {
        match &self.metadata {
            Some(meta) if !meta.bhk_options.is_empty() => meta.bhk_options.clone(),
            _ => vec![1, 2, 3, 4],
        }
    }

    pub fn metadata(&self) -> Option<&MetadataResponse> {
        self.metadata.as_ref()
    }

    /// The visible result, if the latest submission succeeded.
    pub fn result(&self) -> Option<&PredictionResponse> {
        match &self.state {
            FormState::ResultShown { result } => Some(result),
            _ => None,
        }
    }

    /// The visible error message, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::MetadataFailed { message } | FormState::ErrorShown { message } => {
                Some(message)
            }
            _ => None,
        }
    }

    // -- Metadata --

    /// Bootstrap the location choices. Only acts in `LoadingMetadata`.
    ///
    /// On success the first location becomes the selection. On failure the
    /// form parks in `MetadataFailed` with no locations; there is no
    /// automatic retry.
    pub fn load_metadata<A: PriceApi>(&mut self, api: &A) -> &FormState {
        if self.state != FormState::LoadingMetadata {
            return &self.state;
        }

        match api.fetch_metadata() {
            Ok(meta) => {
                let first = meta.locations.first().cloned().unwrap_or_default();
                self.request = PredictionRequest {
                    location: first,
                    ..self.request.clone()
                };
                self.metadata = Some(meta);
                self.state = FormState::Ready;
            }
            Err(_) => {
                self.metadata = None;
                self.state = FormState::MetadataFailed {
                    message: METADATA_FAULT_MESSAGE.to_string(),
                };
            }
        }

        &self.state
    }

    /// Try the metadata bootstrap again after a failure.
    pub fn retry_metadata<A: PriceApi>(&mut self, api: &A) -> &FormState {
        if matches!(self.state, FormState::MetadataFailed { .. }) {
            self.state = FormState::LoadingMetadata;
            return self.load_metadata(api);
        }
        &self.state
    }

    // -- Editing --

    /// Set one field from raw input text, replacing the request wholesale.
    pub fn edit(&mut self, field: FormField, raw: &str) -> Result<(), FormError> {
        self.ensure_interactive()?;
        self.request = apply_edit(&self.request, field, raw)?;
        Ok(())
    }

    // -- Submission --

    /// Start a submission: enter `Predicting`, clearing any shown result or
    /// error. Returns the ticket and the request to send.
    pub fn begin_submit(&mut self) -> Result<(SubmissionTicket, PredictionRequest), FormError> {
        self.ensure_interactive()?;

        self.last_ticket += 1;
        let ticket = SubmissionTicket(self.last_ticket);
        self.state = FormState::Predicting { ticket };
        self.submitted_at = Some(Instant::now());

        Ok((ticket, self.request.clone()))
    }

    /// Apply the outcome of a submission, unless it has been superseded or
    /// the form was disposed.
    pub fn complete(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<PredictionResponse, ApiError>,
    ) -> Completion {
        match &self.state {
            FormState::Disposed => return Completion::Disposed,
            FormState::Predicting { ticket: current } if *current == ticket => {}
            _ => return Completion::Stale,
        }

        self.state = match outcome {
            Ok(result) => FormState::ResultShown { result },
            Err(err) => {
                let message = err.user_message();
                FormState::ErrorShown {
                    message: if message.trim().is_empty() {
                        PREDICT_ERROR_FALLBACK.to_string()
                    } else {
                        message
                    },
                }
            }
        };
        self.submitted_at = None;
        Completion::Applied
    }

    /// Submit the current request and wait for the outcome.
    ///
    /// Successful results are held back until the reveal delay has elapsed
    /// since submission; failures are shown immediately.
    pub fn submit<A: PriceApi>(&mut self, api: &A) -> Result<Completion, FormError> {
        let (ticket, request) = self.begin_submit()?;
        let outcome = api.predict(&request);
        if outcome.is_ok() {
            std::thread::sleep(self.remaining_reveal_delay());
        }
        Ok(self.complete(ticket, outcome))
    }

    /// Time left before a result may be shown for the in-flight submission.
    pub fn remaining_reveal_delay(&self) -> Duration {
        match self.submitted_at {
            Some(at) => self.reveal_delay.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Tear the controller down. Later completions are ignored.
    pub fn dispose(&mut self) {
        self.state = FormState::Disposed;
        self.submitted_at = None;
    }

    fn ensure_interactive(&self) -> Result<(), FormError> {
        if self.state.is_interactive() {
            Ok(())
        } else {
            Err(FormError::Unavailable {
                state: self.state.name(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
