use std::io::Write;
use tokio::sync::mpsc;
use crate::loggers::core::{LogRecord, LogTarget};

pub struct LogWorker {
    receiver: mpsc::Receiver<LogRecord>,
    target: LogTarget,
}

impl LogWorker {
    pub fn new(receiver: mpsc::Receiver<LogRecord>, target: LogTarget) -> Self {
        Self { receiver, target }
    }

    /// Drains the channel until every `Logger` handle has been dropped.
    pub async fn run(mut self) {
        while let Some(record) = self.receiver.recv().await {
            self.emit(&record);
        }
    }

    fn emit(&self, record: &LogRecord) {
        let Ok(json) = serde_json::to_string(record) else {
            return;
        };
        // write errors (closed pipe etc.) are ignored, logging is best-effort
        match self.target {
            LogTarget::Stdout => {
                let _ = writeln!(std::io::stdout().lock(), "{}", json);
            }
            LogTarget::Stderr => {
                let _ = writeln!(std::io::stderr().lock(), "{}", json);
            }
            LogTarget::Discard => {}
        }
    }
}
