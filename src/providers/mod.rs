use crate::core::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod base_client;
pub mod chat_client;
pub mod framing;
#[cfg(test)]
pub(crate) mod test_support;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Receives each non-empty delta in arrival order. An error aborts the stream.
pub type TokenCallback<'a> = &'a mut (dyn FnMut(&str) -> Result<(), AppError> + Send);

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Streams one reply for `messages`, returning the concatenated text.
    async fn chat_stream(
        &self,
        messages: &[Message],
        on_token: TokenCallback<'_>,
    ) -> Result<String, AppError>;
}
