use crate::domain::model::{Actor, OrderAction, OrderStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid transition: {actor} cannot {action} an order that is {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: OrderAction,
        actor: Actor,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 呼叫端輸入有誤
    Input,
    /// 訂單狀態已改變
    State,
    Lookup,
    Configuration,
    System,
}

impl MarketError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Input,
            Self::InvalidTransition { .. } => ErrorCategory::State,
            Self::NotFound { .. } => ErrorCategory::Lookup,
            Self::Config { .. } | Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                ErrorCategory::Configuration
            }
            Self::Io(_) | Self::Serialization(_) | Self::Http(_) => ErrorCategory::System,
        }
    }

    /// 核心錯誤皆可由呼叫端修正後重試
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.category(), ErrorCategory::System)
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Correct the request fields and submit again",
            ErrorCategory::State => "Re-fetch the order and choose an action allowed from its current status",
            ErrorCategory::Lookup => "Check the identifier against the current catalog or order list",
            ErrorCategory::Configuration => "Check the TOML configuration file and command line flags",
            ErrorCategory::System => "Check file permissions, the seed file format and network access",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidTransition { from, action, .. } => {
                format!("The order is {} and can no longer be {}", from, action.past_tense())
            }
            Self::NotFound { entity, id } => format!("No {} with id '{}'", entity, id),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
