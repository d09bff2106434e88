//! Port through which the core asks the presentation layer for decisions and
//! reports results to the user.

use log::{error, info};
use std::fmt;

/// Kind of a user facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Capabilities the presentation layer provides to the core
pub trait Presenter {
    /// Asks the user to confirm a destructive action
    fn confirm(&self, message: &str) -> bool;

    /// Shows a non-blocking notice
    fn notify(&self, message: &str, kind: NoticeKind);
}

/// Headless presenter: confirms everything and writes notices to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn confirm(&self, _message: &str) -> bool {
        true
    }

    fn notify(&self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Error => error!("{}", message),
            NoticeKind::Success | NoticeKind::Info => info!("{}", message),
        }
    }
}
