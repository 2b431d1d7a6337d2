//! Terminal rendering of scheduler notifications.

use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

use loopviz_core::{Notification, Snapshot};
use loopviz_scheduler::{NotificationSink, Scheduler};

/// Output format for rendered notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Human-readable panels and log lines.
    #[default]
    Text,
    /// One JSON object per notification.
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format {other:?} (expected text or json)")),
        }
    }
}

/// Buffers rendered output until the shell flushes it.
///
/// Also remembers the pops the scheduler asked for, so the shell can arm
/// timers for them.
#[derive(Debug, Default)]
pub struct Renderer {
    format: Format,
    buffer: String,
    scheduled_pops: Vec<Duration>,
}

impl Renderer {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Take everything rendered since the last call.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Take the delays of pops requested since the last call.
    pub fn take_scheduled_pops(&mut self) -> Vec<Duration> {
        std::mem::take(&mut self.scheduled_pops)
    }

    /// Write a line that is not a notification (command feedback, help).
    pub fn note(&mut self, line: &str) {
        match self.format {
            Format::Text => {
                self.buffer.push_str(line);
                self.buffer.push('\n');
            }
            Format::Json => {
                let value = serde_json::json!({ "kind": "note", "line": line });
                self.buffer.push_str(&value.to_string());
                self.buffer.push('\n');
            }
        }
    }

    fn render_json(&mut self, notification: &Notification) {
        match serde_json::to_string(notification) {
            Ok(line) => {
                self.buffer.push_str(&line);
                self.buffer.push('\n');
            }
            Err(e) => warn!(error = %e, "failed to serialize notification"),
        }
    }

    fn render_text(&mut self, notification: &Notification) {
        let line = match notification {
            Notification::Render(snapshot) => {
                self.buffer.push_str(&format_snapshot(snapshot));
                return;
            }
            Notification::Log { line } => format!("• {line}"),
            Notification::LogCleared => "• (log cleared)".to_string(),
            Notification::Highlight {
                region,
                duration_ms,
            } => format!("  ▶ {region} ({duration_ms}ms)"),
            Notification::Starving { region } => format!("  ⚠️  {region} starving"),
            Notification::StarvingCleared { region } => format!("  {region} no longer starving"),
            Notification::PopScheduled { delay_ms } => {
                format!("  ⏱  call stack pops in {delay_ms}ms")
            }
        };
        self.buffer.push_str(&line);
        self.buffer.push('\n');
    }
}

impl NotificationSink for Renderer {
    fn notify(&mut self, notification: Notification) {
        if let Notification::PopScheduled { delay_ms } = notification {
            self.scheduled_pops.push(Duration::from_millis(delay_ms));
        }
        match self.format {
            Format::Text => self.render_text(&notification),
            Format::Json => self.render_json(&notification),
        }
    }
}

/// Write whatever the scheduler's renderer has buffered to `output`.
pub async fn flush<W: AsyncWrite + Unpin>(
    scheduler: &mut Scheduler<Renderer>,
    output: &mut W,
) -> anyhow::Result<()> {
    let text = scheduler.sink_mut().take_output();
    if !text.is_empty() {
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}

/// The four panels of the diagram, one row each.
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!("┌─ t={} ", snapshot.time));
    out.push_str(&"─".repeat(40));
    out.push('\n');
    out.push_str(&format!("│ call stack  {}\n", row(&snapshot.call_stack)));
    out.push_str(&format!("│ microtasks  {}\n", row(&snapshot.microtasks)));
    if snapshot.starving {
        out.push_str(&format!("│ macrotasks  {}  ⚠️ starving\n", row(&snapshot.macrotasks)));
    } else {
        out.push_str(&format!("│ macrotasks  {}\n", row(&snapshot.macrotasks)));
    }
    out.push_str(&format!("│ timers      {}\n", row(&snapshot.timers)));
    out.push_str("└");
    out.push_str(&"─".repeat(46));
    out.push('\n');

    out
}

fn row(labels: &[String]) -> String {
    if labels.is_empty() {
        "·".to_string()
    } else {
        labels
            .iter()
            .map(|l| format!("[{l}]"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
