// Log capture for the TUI. Events go to an in-memory ring buffer that the
// debug pane renders, so nothing is written through the alternate screen.
// A JSON file log can be added on top via the logging config.

use anyhow::{Context as _, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogConfig;

const MAX_LOG_LINES: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
}

/// Bounded, shareable log buffer. The oldest line is dropped once full.
#[derive(Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<LogLine>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: LogLine) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() >= MAX_LOG_LINES {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    /// Last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<LogLine> {
        match self.lines.lock() {
            Ok(lines) => {
                let start = lines.len().saturating_sub(n);
                lines.iter().skip(start).cloned().collect()
            }
            Err(_) => Vec::new(),
        }
    }
}

pub struct TuiLogLayer {
    buffer: LogBuffer,
}

impl TuiLogLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(LogLine {
            level: *event.metadata().level(),
            message: visitor.finish(),
        });
    }
}

// Renders `message` first, then the remaining fields as key=value.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: Vec<String>,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            return self.message;
        }
        format!("{} {}", self.message, self.fields.join(" "))
    }
}

impl tracing::field::Visit for LineVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// The returned guard must live until exit so the file writer flushes.
pub fn init(cfg: &LogConfig, buffer: LogBuffer) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .with_context(|| format!("invalid log level: {}", cfg.level))?;
    let Some(dir) = &cfg.file_dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(TuiLogLayer::new(buffer))
            .try_init()
            .context("installing tracing subscriber")?;
        return Ok(None);
    };
    std::fs::create_dir_all(dir).with_context(|| format!("creating log dir: {dir:?}"))?;
    let appender = tracing_appender::rolling::never(dir, &cfg.file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(TuiLogLayer::new(buffer))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(Some(guard))
}
