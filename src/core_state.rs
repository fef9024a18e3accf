//! Long-lived application state.
//!
//! `CoreState` is built once at startup and shared (behind `Arc`) with every
//! request handler. It owns the translation and generation clients, the
//! normalizer, the response table, the feedback store and the open chat
//! sessions. Nothing is reachable through globals.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::feedback::{FeedbackError, FeedbackStore};
use crate::models::{ConversationTurn, FeedbackRecord, FeedbackStats};
use crate::pipeline::generate::{GenerateError, OllamaGenerator, TextGenerator};
use crate::pipeline::normalize::Normalizer;
use crate::pipeline::responder::{ResponseTable, ResponseTableError};
use crate::pipeline::translate::{GoogleTranslator, TranslateError, Translator};
use crate::pipeline::{ChatOutcome, ChatPipeline};
use crate::session::SessionRegistry;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Internal lock poisoned")]
    LockPoisoned,

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

/// Failures that stop the service from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Cannot load feedback store: {0}")]
    Feedback(#[from] FeedbackError),

    #[error("Cannot load response table: {0}")]
    ResponseTable(#[from] ResponseTableError),

    #[error("Cannot create translation client: {0}")]
    Translator(#[from] TranslateError),

    #[error("Cannot create generation client: {0}")]
    Generator(#[from] GenerateError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

pub struct CoreState {
    translator: Arc<dyn Translator>,
    generator: Arc<dyn TextGenerator>,
    normalizer: Normalizer,
    table: ResponseTable,
    max_generation_length: u32,
    feedback: Mutex<FeedbackStore>,
    sessions: Mutex<SessionRegistry>,
}

impl CoreState {
    /// Build the production services and load persisted feedback.
    ///
    /// Blocking: call before entering the async runtime.
    pub fn bootstrap(config: &AppConfig) -> Result<Self, StartupError> {
        let table = match &config.responses_file {
            Some(path) => ResponseTable::load(path)?,
            None => ResponseTable::builtin(),
        };

        let translator = GoogleTranslator::new(&config.translate_url, config.translate_timeout_secs)?;

        let mut generator = OllamaGenerator::new(
            &config.ollama_url,
            &config.model,
            config.generation_timeout_secs,
        )?;
        let resolved = generator.resolve_preferred_model().map(str::to_string);
        match resolved {
            Ok(model) => tracing::info!(model = %model, "Generation model ready"),
            Err(e) => tracing::warn!(
                error = %e,
                model = generator.model(),
                "Generation model unavailable; unmatched questions will get the fallback reply"
            ),
        }

        let feedback = FeedbackStore::load(&config.feedback_file)?;

        tracing::info!(entries = table.len(), "Response table ready");

        Ok(Self::with_services(
            Arc::new(translator),
            Arc::new(generator),
            table,
            feedback,
        )
        .with_max_generation_length(config.max_generation_length)
        .with_session_limits(
            Duration::from_secs(config.session_idle_timeout_secs),
            config.max_sessions,
        ))
    }

    /// Assemble from explicit collaborators.
    pub fn with_services(
        translator: Arc<dyn Translator>,
        generator: Arc<dyn TextGenerator>,
        table: ResponseTable,
        feedback: FeedbackStore,
    ) -> Self {
        Self {
            translator,
            generator,
            normalizer: Normalizer::english(),
            table,
            max_generation_length: crate::config::MAX_GENERATION_LENGTH,
            feedback: Mutex::new(feedback),
            sessions: Mutex::new(SessionRegistry::new()),
        }
    }

    pub fn with_max_generation_length(mut self, max_length: u32) -> Self {
        self.max_generation_length = max_length;
        self
    }

    /// Replace the session registry with one using the given limits.
    pub fn with_session_limits(mut self, idle_timeout: Duration, max_sessions: usize) -> Self {
        self.sessions = Mutex::new(SessionRegistry::with_limits(idle_timeout, max_sessions));
        self
    }

    // ── Chat ────────────────────────────────────────────────

    /// Run one conversation step for a session.
    ///
    /// A session is created when the id is absent or unknown, except for
    /// blank input, which never creates one (`None` is returned then).
    /// The pipeline runs on a snapshot without holding the session lock;
    /// only the new turns are appended afterwards, and the returned history
    /// is the stored one, including turns of concurrent requests.
    pub fn chat(
        &self,
        session_id: Option<Uuid>,
        user_input: &str,
    ) -> Result<(Option<Uuid>, ChatOutcome), CoreError> {
        let blank = user_input.trim().is_empty();
        let (id, history) = {
            let mut sessions = self.lock_sessions()?;
            let id = if blank {
                session_id.filter(|id| sessions.contains(id))
            } else {
                Some(sessions.open(session_id))
            };
            let history = id
                .and_then(|id| sessions.snapshot(&id))
                .unwrap_or_default();
            (id, history)
        };
        let prior_len = history.len();

        let pipeline = ChatPipeline::new(
            self.translator.as_ref(),
            self.generator.as_ref(),
            &self.normalizer,
            &self.table,
        )
        .with_max_generation_length(self.max_generation_length);
        let mut outcome = pipeline.handle(user_input, history);

        if let Some(id) = id {
            let new_turns = &outcome.history[prior_len..];
            if !new_turns.is_empty() {
                match self.lock_sessions()?.append(&id, new_turns) {
                    Some(stored) => outcome.history = stored.to_vec(),
                    None => tracing::warn!(session = %id, "Session ended during request; turns dropped"),
                }
            }
        }
        Ok((id, outcome))
    }

    pub fn history(&self, session_id: &Uuid) -> Result<Vec<ConversationTurn>, CoreError> {
        let mut sessions = self.lock_sessions()?;
        sessions.evict_idle();
        sessions
            .history(session_id)
            .map(<[ConversationTurn]>::to_vec)
            .ok_or(CoreError::SessionNotFound(*session_id))
    }

    pub fn end_session(&self, session_id: &Uuid) -> Result<(), CoreError> {
        if self.lock_sessions()?.end(session_id) {
            Ok(())
        } else {
            Err(CoreError::SessionNotFound(*session_id))
        }
    }

    pub fn session_count(&self) -> Result<usize, CoreError> {
        let mut sessions = self.lock_sessions()?;
        sessions.evict_idle();
        Ok(sessions.len())
    }

    // ── Feedback ────────────────────────────────────────────

    pub fn submit_feedback(
        &self,
        query: &str,
        response: &str,
        is_helpful: bool,
        user_comment: Option<&str>,
    ) -> Result<FeedbackRecord, CoreError> {
        let mut store = self.lock_feedback()?;
        let record = store.append(query, response, is_helpful, user_comment)?;
        Ok(record.clone())
    }

    pub fn feedback_stats(&self) -> Result<FeedbackStats, CoreError> {
        Ok(self.lock_feedback()?.stats())
    }

    // ── Collaborator status ─────────────────────────────────

    pub fn generator_available(&self) -> bool {
        self.generator.is_available()
    }

    pub fn response_count(&self) -> usize {
        self.table.len()
    }

    fn lock_sessions(&self) -> Result<MutexGuard<'_, SessionRegistry>, CoreError> {
        self.sessions.lock().map_err(|_| CoreError::LockPoisoned)
    }

    fn lock_feedback(&self) -> Result<MutexGuard<'_, FeedbackStore>, CoreError> {
        self.feedback.lock().map_err(|_| CoreError::LockPoisoned)
    }
}
