//! # LogWriter: event stream printer
//!
//! Prints every [`Event`] to stdout as one line: elapsed milliseconds,
//! philosopher id, description. With the `color` feature enabled and
//! [`LogWriter::with_color`] set, each field is colored by kind.
//!
//! ## Example output
//! ```text
//! 0 1 took right fork (1)
//! 0 1 took left fork (0)
//! 0 1 is eating (meal #1)
//! 200 1 is sleeping
//! 400 1 is thinking
//! ```

use std::io::Write;

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Event stream printer.
#[derive(Debug, Default)]
pub struct LogWriter {
    color: bool,
}

impl LogWriter {
    /// Construct a plain [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self { color: false }
    }

    /// Enables per-kind colors (no effect without the `color` feature).
    #[must_use]
    pub fn with_color(mut self, on: bool) -> Self {
        self.color = on;
        self
    }

    fn render(&self, e: &Event) -> String {
        if self.color { paint(e) } else { e.to_string() }
    }
}

#[cfg(feature = "color")]
fn paint(e: &Event) -> String {
    use crossterm::style::{Color, Stylize};

    use crate::events::EventKind;

    let tint = match e.kind {
        EventKind::Died => Color::Red,
        EventKind::Eating { .. } => Color::Green,
        EventKind::Sleeping => Color::Blue,
        EventKind::Thinking => Color::Magenta,
        EventKind::TookFork { .. } => Color::White,
    };
    format!(
        "{} {} {}",
        e.at_ms.to_string().with(Color::DarkGrey),
        e.philosopher.to_string().with(Color::Yellow),
        e.kind.to_string().with(tint),
    )
}

#[cfg(not(feature = "color"))]
fn paint(e: &Event) -> String {
    e.to_string()
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let line = self.render(e);
        let mut out = std::io::stdout().lock();
        // Write errors (closed pipe) are ignored.
        let _ = writeln!(out, "{line}");
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }

    fn queue_capacity(&self) -> usize {
        8192
    }
}
