//! Error types for Elemental

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("hook failed: {hook} - {message}")]
    HookFailure { hook: String, message: String },

    #[error("entropy source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HookFailure {
            hook: hook.into(),
            message: message.into(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Attribute this error to a lifecycle hook. An error that already names
    /// a hook keeps the innermost one.
    pub fn in_hook(self, hook: &str) -> Self {
        if self.is_hook_failure() {
            self
        } else {
            Self::hook(hook, self.to_string())
        }
    }

    pub fn is_hook_failure(&self) -> bool {
        matches!(self, Self::HookFailure { .. })
    }
}
