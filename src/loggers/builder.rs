use tokio::sync::mpsc;
use crate::loggers::worker::LogWorker;
use crate::loggers::core::{LogLevel, LogRecord, LogTarget};
use std::sync::Arc;
use arc_swap::ArcSwap;

pub struct LoggerConfig {
    pub level: LogLevel,
    pub component: String,
}

#[derive(Clone)]
pub struct Logger {
    pub sender: mpsc::Sender<LogRecord>,
    pub config: Arc<ArcSwap<LoggerConfig>>,
}

impl Logger {
    /// Changes the minimum level for this logger and every clone of it.
    pub fn set_level(&self, level: LogLevel) {
        let component = self.config.load().component.clone();
        self.config.store(Arc::new(LoggerConfig { level, component }));
    }

    pub fn level(&self) -> LogLevel {
        self.config.load().level
    }
}

pub struct LoggerBuilder {
    component: String,
    level: LogLevel,
    target: LogTarget,
    buffer_size: usize,
}

impl LoggerBuilder {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            level: LogLevel::Info,
            target: LogTarget::Stdout,
            buffer_size: 1024,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Spawns the log worker on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`NgError::ConfigError`](crate::NgError::ConfigError) when called
    /// outside a tokio runtime.
    pub fn build(self) -> Result<Logger, crate::core::error::NgError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            crate::core::error::NgError::ConfigError(format!("Logger needs a tokio runtime: {}", e))
        })?;

        let (tx, rx) = mpsc::channel(self.buffer_size);
        let config = Arc::new(ArcSwap::from_pointee(LoggerConfig {
            level: self.level,
            component: self.component,
        }));

        let worker = LogWorker::new(rx, self.target);
        handle.spawn(async move {
            worker.run().await;
        });

        Ok(Logger { sender: tx, config })
    }
}
