use super::base_client::BaseApiClient;
use super::framing::{Frame, LineBuffer, StreamFormat};
use super::{ChatBackend, Message};
use crate::core::error::AppError;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Streaming chat-completions client.
#[derive(Clone)]
pub struct ChatClient {
    client: BaseApiClient,
    model: String,
    format: StreamFormat,
}

impl ChatClient {
    pub fn new(host: String, api_key: Option<String>, model: String, format: StreamFormat) -> Self {
        Self::with_base(BaseApiClient::new(host, api_key), model, format)
    }

    pub fn with_base(client: BaseApiClient, model: String, format: StreamFormat) -> Self {
        Self {
            client,
            model,
            format,
        }
    }

    /// Feeds one line through the decoder. Returns true once the stream has ended.
    fn consume_line(
        &self,
        line: &str,
        reply: &mut String,
        on_token: &mut (dyn FnMut(&str) -> Result<(), AppError> + Send + '_),
    ) -> Result<bool, AppError> {
        let (chunk, ended) = match self.format.decode_line(line)? {
            Frame::Skip => return Ok(false),
            Frame::Chunk(chunk) => (Some(chunk), false),
            Frame::End(chunk) => (chunk, true),
        };

        if let Some(chunk) = chunk {
            if !chunk.delta.is_empty() {
                on_token(&chunk.delta)?;
                reply.push_str(&chunk.delta);
            }
            if let Some(reason) = chunk.finish_reason {
                debug!(%reason, "backend finished reply");
            }
        }
        Ok(ended)
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn chat_stream(
        &self,
        messages: &[Message],
        on_token: super::TokenCallback<'_>,
    ) -> Result<String, AppError> {
        let payload = ChatRequest {
            model: &self.model,
            messages,
            stream: true,
        };

        debug!(model = %self.model, messages = messages.len(), "sending chat request");
        let response = self
            .client
            .send_request(self.format.path(), &payload)
            .await?;

        let mut body = response.bytes_stream();
        let mut lines = LineBuffer::new();
        let mut reply = String::new();

        loop {
            while let Some(line) = lines.next_line()? {
                if self.consume_line(&line, &mut reply, on_token)? {
                    debug!(chars = reply.len(), "stream ended");
                    return Ok(reply);
                }
            }

            match body.next().await {
                Some(Ok(bytes)) => lines.push(&bytes),
                Some(Err(e)) => return Err(e.into()),
                None => break,
            }
        }

        if let Some(line) = lines.finish()? {
            self.consume_line(&line, &mut reply, on_token)?;
        }

        debug!(chars = reply.len(), "body closed without end marker");
        Ok(reply)
    }
}
