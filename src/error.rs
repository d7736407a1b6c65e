use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("验证失败: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        details: Option<JsonValue>,
    },

    #[error("预算约束被破坏: 已选平台费用 {selected:.2} 超出预算 {budget:.2}")]
    BudgetInvariant { selected: f64, budget: f64 },

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            source: None,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, details = %details, "validation error with details");
        AppError::Validation {
            message,
            source: None,
            details: Some(details),
        }
    }

    /// A selected platform set whose cost exceeds the budget ceiling.
    /// Unreachable when the selector honors its contract; surfaced loudly
    /// so tests and operators catch the defect instead of a bad plan.
    pub fn budget_invariant(selected: f64, budget: f64) -> Self {
        error!(
            target: "app::rotation",
            selected,
            budget,
            "selected platform cost exceeds budget ceiling"
        );
        AppError::BudgetInvariant { selected, budget }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }
}
