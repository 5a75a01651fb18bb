//! Terminal spinner shown while a boundary table is computed.
//!
//! The spinner ticks on its own tokio task and stops when it receives the
//! run outcome over a oneshot channel. It holds no data of the computation.

use crate::constants::SPINNER_TICK_MS;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// How the computation behind a spinner ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
}

pub struct Spinner {
    bar: ProgressBar,
    done: Option<oneshot::Sender<Outcome>>,
    task: JoinHandle<()>,
}

impl Spinner {
    /// Start ticking; must be called from within a tokio runtime
    pub fn start(message: impl Into<String>, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("|/-\\ "),
        );
        bar.set_message(message.into());

        let (done, signal) = oneshot::channel();
        let task = tokio::spawn(tick(bar.clone(), signal));

        Self {
            bar,
            done: Some(done),
            task,
        }
    }

    /// Signal the outcome and wait for the spinner to draw its last frame
    pub async fn finish(mut self, outcome: Outcome) {
        if let Some(done) = self.done.take() {
            let _ = done.send(outcome);
        }
        if let Err(e) = (&mut self.task).await {
            debug!("Spinner task ended abnormally: {}", e);
        }
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

async fn tick(bar: ProgressBar, mut signal: oneshot::Receiver<Outcome>) {
    let mut interval = tokio::time::interval(Duration::from_millis(SPINNER_TICK_MS));
    loop {
        tokio::select! {
            outcome = &mut signal => {
                match outcome {
                    Ok(Outcome::Done) => bar.finish_with_message("Done!"),
                    Ok(Outcome::Failed) => bar.abandon_with_message("Failed"),
                    // Spinner dropped without an outcome
                    Err(_) => bar.finish_and_clear(),
                }
                break;
            }
            _ = interval.tick() => bar.tick(),
        }
    }
}
