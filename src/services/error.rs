//! Errors raised by subscriber callbacks
//!
//! The publisher never recovers from these: the first error a callback
//! returns ends the fan-out and is handed back to the caller unchanged.

use thiserror::Error;

/// Failure reported by a subscriber while handling a notification.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The presentation collaborator could not render a notice or report.
    #[error("presenter for '{subscriber}' failed: {reason}")]
    Presenter {
        /// Name of the subscriber whose presenter failed.
        subscriber: String,
        /// Underlying failure description.
        reason: String,
    },

    /// The subscriber refused the notification.
    #[error("notification rejected: {reason}")]
    Rejected {
        /// Why the notification was refused.
        reason: String,
    },
}

impl NotifyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use visitor_watch::services::NotifyError;
    ///
    /// let err = NotifyError::Rejected { reason: "badge revoked".into() };
    /// assert_eq!(err.as_label(), "notify_rejected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifyError::Presenter { .. } => "notify_presenter_failed",
            NotifyError::Rejected { .. } => "notify_rejected",
        }
    }

    pub(crate) fn presenter(subscriber: &str, reason: impl std::fmt::Display) -> Self {
        NotifyError::Presenter { subscriber: subscriber.to_string(), reason: reason.to_string() }
    }
}
