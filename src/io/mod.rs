//! IO modules - presentation of notices and reports
//!
//! - `report` - Pure formatting into structured notices and period reports
//! - `presenter` - Rendering seam (console text/JSON lines, in-memory capture)

pub mod presenter;
pub mod report;

// Re-export commonly used types
pub use presenter::{ConsolePresenter, OutputFormat, Presented, Presenter, RecordingPresenter};
pub use report::{Notice, NoticeKind, PeriodReport, ReportRow};
