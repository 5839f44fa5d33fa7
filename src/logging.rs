use crate::constants::MAX_LOG_LINES;
use anyhow::Context;
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, Layer};

/// Bounded ring of formatted log lines backing the in-app debug console.
/// Cheap to clone; all clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LogBuffer {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            while lines.len() >= MAX_LOG_LINES {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.clone(),
            pending: Vec::new(),
        }
    }
}

pub struct BufferWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            if !text.is_empty() {
                self.buffer.push(text);
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps the pieces of the logging setup the app needs to hold on to: the
/// console buffer, the log directory for "View Logs", and the appender
/// guard that flushes the file on shutdown.
pub struct LoggingHandle {
    pub log_dir: PathBuf,
    pub buffer: LogBuffer,
    _guard: WorkerGuard,
}

/// Sets up the subscriber stack: a daily-rolling debug-level file under
/// `~/.convertext/`, a debug-level in-memory buffer for the console
/// window, and stdout at info (overridable through `RUST_LOG`).
pub fn init() -> anyhow::Result<LoggingHandle> {
    let log_dir = dirs::home_dir()
        .context("home directory not found")?
        .join(".convertext");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "gui.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let buffer = LogBuffer::default();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(LevelFilter::DEBUG),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(buffer.clone())
                .with_ansi(false)
                .with_filter(LevelFilter::DEBUG),
        )
        .with(
            tracing_subscriber::fmt::layer().with_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            ),
        )
        .init();

    Ok(LoggingHandle {
        log_dir,
        buffer,
        _guard: guard,
    })
}
