use thiserror::Error;

#[derive(Error, Debug)]
pub enum JotterError {
    #[error("Note not found: {id}")]
    NotFound { id: String, message: Option<String> },

    #[error("Request failed - {0}")]
    Transport(String),

    #[error("Request failed ({status}){}", status_suffix(.message))]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl JotterError {
    /// A `NotFound` with no server message attached.
    pub fn not_found(id: impl Into<String>) -> Self {
        JotterError::NotFound {
            id: id.into(),
            message: None,
        }
    }

    /// The message carried by the failure payload, if the server sent one.
    pub fn payload_message(&self) -> Option<&str> {
        match self {
            JotterError::Status {
                message: Some(message),
                ..
            }
            | JotterError::NotFound {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Human readable text for the store's `error` field and error toasts.
    ///
    /// Prefers the payload message, then the error's own description, then
    /// `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(message) = self.payload_message().filter(|m| !m.trim().is_empty()) {
            return message.to_string();
        }
        let described = self.to_string();
        if described.trim().is_empty() {
            fallback.to_string()
        } else {
            described
        }
    }
}

impl From<reqwest::Error> for JotterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            JotterError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            JotterError::Status {
                status: status.as_u16(),
                message: None,
            }
        } else {
            JotterError::Transport(err.to_string())
        }
    }
}

impl From<confique::Error> for JotterError {
    fn from(err: confique::Error) -> Self {
        JotterError::Config(err.to_string())
    }
}

fn status_suffix(message: &Option<String>) -> String {
    match message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => format!(" - {}", m),
        _ => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, JotterError>;
