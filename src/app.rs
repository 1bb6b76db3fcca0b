use crate::commands::{Command, CommandDispatcher, CommandOutcome};
use crate::core::error::AppError;
use crate::display::{self, PROMPT};
use crate::input::LineSource;
use crate::progress::ProgressIndicator;
use crate::providers::{ChatBackend, Message, Role};
use crate::utils::text::{extract_last_code_block, is_complete};
use std::io::{self, Write};
use tracing::debug;

const NO_QUESTIONS_PREFIX: &str =
    "Generate your best prompt without asking clarifying questions. User's idea: ";
const WAITING_MESSAGE: &str = "Thinking...";

type Sink = Box<dyn Write + Send>;

/// Ordered message history. Always starts with the system prompt.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent assistant reply, if any turn has completed.
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// A terminal is attached and can answer follow-up questions.
    pub interactive: bool,
    /// Suppress streamed output; print only the final block.
    pub quiet: bool,
}

enum NextStep {
    Send(String),
    Exit,
}

pub struct Application {
    backend: Box<dyn ChatBackend>,
    dispatcher: CommandDispatcher,
    input: Option<Box<dyn LineSource>>,
    system_prompt: String,
    options: SessionOptions,
    out: Sink,
    err: Sink,
    progress_sink: Box<dyn Fn() -> Sink>,
}

impl Application {
    pub fn new(
        backend: Box<dyn ChatBackend>,
        dispatcher: CommandDispatcher,
        system_prompt: String,
        options: SessionOptions,
    ) -> Self {
        Self {
            backend,
            dispatcher,
            input: None,
            system_prompt,
            options,
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            progress_sink: Box::new(|| -> Sink { Box::new(io::stdout()) }),
        }
    }

    pub fn with_input(mut self, input: Box<dyn LineSource>) -> Self {
        self.input = Some(input);
        self
    }

    #[cfg(test)]
    pub fn with_output(mut self, out: Sink, err: Sink) -> Self {
        self.out = out;
        self.err = err;
        self
    }

    #[cfg(test)]
    pub fn with_progress_sink(mut self, sink: impl Fn() -> Sink + 'static) -> Self {
        self.progress_sink = Box::new(sink);
        self
    }

    /// Runs the conversation for `idea` until a final prompt, an exit command, or a failure.
    pub async fn run(&mut self, idea: &str) -> Result<(), AppError> {
        let mut conversation = Conversation::new(self.system_prompt.as_str());
        if self.options.interactive {
            conversation.push_user(idea);
        } else {
            conversation.push_user(format!("{}{}", NO_QUESTIONS_PREFIX, idea));
        }

        let mut turn = 0;
        loop {
            turn += 1;
            let reply = self.stream_turn(&conversation).await?;
            let complete = is_complete(&reply);
            debug!(turn, complete, chars = reply.len(), "reply received");
            conversation.push_assistant(reply);

            if !self.options.interactive {
                if !complete {
                    return Err(AppError::Clarification);
                }
                if self.options.quiet {
                    let reply = conversation.last_reply().unwrap_or_default();
                    self.emit_final_block(extract_last_code_block(reply))?;
                }
                return Ok(());
            }

            match self.next_step(conversation.last_reply())? {
                NextStep::Send(text) => conversation.push_user(text),
                NextStep::Exit => return Ok(()),
            }
        }
    }

    /// Sends the history and streams the reply, with the indicator covering the wait.
    async fn stream_turn(&mut self, conversation: &Conversation) -> Result<String, AppError> {
        let animate = self.options.interactive && !self.options.quiet;
        let indicator = ProgressIndicator::new(WAITING_MESSAGE, animate, (self.progress_sink)());
        indicator.start();

        let quiet = self.options.quiet;
        let out = &mut self.out;
        let mut on_token = |token: &str| -> Result<(), AppError> {
            indicator.stop();
            if !quiet {
                out.write_all(token.as_bytes())?;
                out.flush()?;
            }
            Ok(())
        };

        let result = self
            .backend
            .chat_stream(conversation.messages(), &mut on_token)
            .await;
        indicator.stop();
        let reply = result?;

        if !quiet {
            writeln!(self.out)?;
            self.out.flush()?;
        }
        Ok(reply)
    }

    fn emit_final_block(&mut self, block: &str) -> Result<(), AppError> {
        self.out.write_all(block.as_bytes())?;
        if !block.ends_with('\n') {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Reads input until there is a message to send or the session ends.
    fn next_step(&mut self, last_reply: Option<&str>) -> Result<NextStep, AppError> {
        loop {
            let line = match self.input.as_mut() {
                Some(input) => input.read_line(PROMPT)?,
                None => None,
            };
            let Some(line) = line else {
                display::display_farewell(self.out.as_mut())?;
                return Ok(NextStep::Exit);
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(command) = Command::parse(line) else {
                return Ok(NextStep::Send(line.to_string()));
            };

            debug!(?command, "dispatching command");
            match self
                .dispatcher
                .execute(&command, last_reply, self.out.as_mut())
            {
                Ok(CommandOutcome::Exit) => return Ok(NextStep::Exit),
                Ok(CommandOutcome::Continue) => {}
                Err(e) => display::display_error(self.err.as_mut(), e)?,
            }
        }
    }
}
