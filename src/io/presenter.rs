//! Presentation collaborators
//!
//! Subscribers call a [`Presenter`] from inside `on_notify`/`on_complete`.
//! - `ConsolePresenter` - text lines or JSON lines written to any `Write`
//! - `RecordingPresenter` - keeps everything in memory (tests, embedding)

use crate::io::report::{Notice, NoticeKind, PeriodReport};
use crate::services::NotifyError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Renders notices and reports produced by subscribers
pub trait Presenter: Send + Sync {
    fn notice(&self, notice: &Notice) -> Result<(), NotifyError>;

    fn report(&self, report: &PeriodReport) -> Result<(), NotifyError>;
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

/// JSON line envelope
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Line<'a> {
    Notice(&'a Notice),
    Report(&'a PeriodReport),
}

/// Writes notices and reports to a byte sink
pub struct ConsolePresenter<W: Write + Send = std::io::Stdout> {
    format: OutputFormat,
    out: Mutex<W>,
}

impl ConsolePresenter<std::io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, std::io::stdout())
    }
}

impl<W: Write + Send> ConsolePresenter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out: Mutex::new(out) }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), NotifyError> {
        let mut out = self.out.lock();
        for line in lines {
            writeln!(out, "{}", line).map_err(|e| NotifyError::presenter("console", e))?;
        }
        out.flush().map_err(|e| NotifyError::presenter("console", e))
    }

    fn write_json(&self, line: &Line<'_>) -> Result<(), NotifyError> {
        let json = serde_json::to_string(line).map_err(|e| NotifyError::presenter("console", e))?;
        self.write_lines(&[json])
    }
}

impl<W: Write + Send> Presenter for ConsolePresenter<W> {
    fn notice(&self, notice: &Notice) -> Result<(), NotifyError> {
        match self.format {
            OutputFormat::Text => self.write_lines(&[notice.headline()]),
            OutputFormat::Json => self.write_json(&Line::Notice(notice)),
        }
    }

    fn report(&self, report: &PeriodReport) -> Result<(), NotifyError> {
        match self.format {
            OutputFormat::Text => {
                let mut lines = report.render();
                lines.push(String::new());
                self.write_lines(&lines)
            }
            OutputFormat::Json => self.write_json(&Line::Report(report)),
        }
    }
}

/// Something a subscriber asked to present
#[derive(Debug, Clone, PartialEq)]
pub enum Presented {
    Notice(Notice),
    Report(PeriodReport),
}

/// In-memory presenter
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    presented: Mutex<Vec<Presented>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything presented so far, in order
    pub fn presented(&self) -> Vec<Presented> {
        self.presented.lock().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.presented
            .lock()
            .iter()
            .filter_map(|p| match p {
                Presented::Notice(n) => Some(n.clone()),
                Presented::Report(_) => None,
            })
            .collect()
    }

    /// Notices of one kind for one audience
    pub fn notices_for(&self, audience: &str, kind: NoticeKind) -> Vec<Notice> {
        self.notices().into_iter().filter(|n| n.audience == audience && n.kind == kind).collect()
    }

    pub fn reports(&self) -> Vec<PeriodReport> {
        self.presented
            .lock()
            .iter()
            .filter_map(|p| match p {
                Presented::Report(r) => Some(r.clone()),
                Presented::Notice(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.presented.lock().clear();
    }
}

impl Presenter for RecordingPresenter {
    fn notice(&self, notice: &Notice) -> Result<(), NotifyError> {
        self.presented.lock().push(Presented::Notice(notice.clone()));
        Ok(())
    }

    fn report(&self, report: &PeriodReport) -> Result<(), NotifyError> {
        self.presented.lock().push(Presented::Report(report.clone()));
        Ok(())
    }
}
