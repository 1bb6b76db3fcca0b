//! Animated "waiting" status line shown until the first token arrives.

use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Idle,
    Running,
    Stopped,
}

type Sink = Box<dyn Write + Send>;

struct Worker {
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct ProgressIndicator {
    message: String,
    interactive: bool,
    interval: Duration,
    state: AtomicU8,
    sink: Mutex<Option<Sink>>,
    worker: Mutex<Option<Worker>>,
}

impl ProgressIndicator {
    pub fn new(message: impl Into<String>, interactive: bool, sink: Sink) -> Self {
        Self::with_interval(message, interactive, sink, DEFAULT_INTERVAL)
    }

    pub fn with_interval(
        message: impl Into<String>,
        interactive: bool,
        sink: Sink,
        interval: Duration,
    ) -> Self {
        Self {
            message: message.into(),
            interactive,
            interval,
            state: AtomicU8::new(IDLE),
            sink: Mutex::new(Some(sink)),
            worker: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> IndicatorState {
        match self.state.load(Ordering::Acquire) {
            IDLE => IndicatorState::Idle,
            RUNNING => IndicatorState::Running,
            _ => IndicatorState::Stopped,
        }
    }

    /// Starts animating. No-op when not interactive or when already started or stopped.
    pub fn start(&self) {
        if !self.interactive {
            return;
        }

        // Held across the transition so a concurrent stop finds the worker.
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let Some(sink) = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            self.state.store(STOPPED, Ordering::Release);
            return;
        };

        let (cancel, cancelled) = mpsc::channel();
        let message = self.message.clone();
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name("progress-indicator".to_string())
            .spawn(move || animate(cancelled, sink, &message, interval));

        match spawned {
            Ok(handle) => *worker = Some(Worker { cancel, handle }),
            Err(e) => {
                warn!(error = %e, "could not start progress indicator");
                self.state.store(STOPPED, Ordering::Release);
            }
        }
    }

    /// Stops the animation and clears the status line. Only the first call has any effect.
    pub fn stop(&self) {
        if self.state.swap(STOPPED, Ordering::AcqRel) != RUNNING {
            return;
        }

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(Worker { cancel, handle }) = worker {
            let _ = cancel.send(());
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn animate(cancelled: Receiver<()>, mut sink: Sink, message: &str, interval: Duration) {
    let mut frame = 0;
    loop {
        match cancelled.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let _ = write!(sink, "\r{} {}", FRAMES[frame], message);
                let _ = sink.flush();
                frame = (frame + 1) % FRAMES.len();
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let _ = sink.write_all(clear_sequence(message).as_bytes());
    let _ = sink.flush();
}

/// Blanks out a drawn status line and returns the cursor to column 0.
fn clear_sequence(message: &str) -> String {
    let width = console::measure_text_width(message) + 2;
    format!("\r{}\r", " ".repeat(width))
}
