use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MediHelp";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Feedback document, relative to the working directory.
pub const FEEDBACK_FILE_NAME: &str = "feedback_data.json";

/// Local Ollama instance used for fallback generation.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model requested from Ollama when no preferred model can be resolved.
pub const DEFAULT_MODEL: &str = "medgemma";

/// Public Google translate endpoint (same one the gtx web client uses).
pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Users may write in any language; matching happens in English.
pub const SOURCE_LANGUAGE: &str = "auto";
pub const WORKING_LANGUAGE: &str = "en";

/// Upper bound on generated output, in tokens.
pub const MAX_GENERATION_LENGTH: u32 = 150;

/// Chat sessions idle this long are discarded.
pub const SESSION_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// Upper bound on concurrently open chat sessions.
pub const MAX_SESSIONS: usize = 10_000;

/// Default HTTP listen address for the chat surface.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8501";

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medihelp_lib=info,medihelp=info,warn"
}

/// Path of the feedback document.
pub fn feedback_file() -> PathBuf {
    PathBuf::from(FEEDBACK_FILE_NAME)
}

/// Runtime configuration assembled once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub feedback_file: PathBuf,
    /// Optional JSON object of canned answers replacing the bundled table.
    pub responses_file: Option<PathBuf>,
    pub ollama_url: String,
    pub model: String,
    pub generation_timeout_secs: u64,
    pub translate_url: String,
    pub translate_timeout_secs: u64,
    pub max_generation_length: u32,
    pub session_idle_timeout_secs: u64,
    pub max_sessions: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            feedback_file: feedback_file(),
            responses_file: None,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            generation_timeout_secs: 300,
            translate_url: DEFAULT_TRANSLATE_URL.to_string(),
            translate_timeout_secs: 15,
            max_generation_length: MAX_GENERATION_LENGTH,
            session_idle_timeout_secs: SESSION_IDLE_TIMEOUT_SECS,
            max_sessions: MAX_SESSIONS,
        }
    }
}
