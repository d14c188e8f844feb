//! Views: one module per screen. Each loads what it needs from the backend,
//! renders to plain text, and exposes the actions a user can take on it.
//!
//! Views never touch the session store directly except for login. A view is
//! only reached after the route guard has admitted the current user.

pub mod admin;
pub mod auth;
pub mod employee;
pub mod forms;
pub mod home;
pub mod notifications;
pub mod profile;
pub mod recruiter;
pub mod subscriptions;

use crate::api::ApiError;
use forms::FormError;
use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// Why a user action did not go through
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Form(#[from] FormError),

    /// Refused locally before anything was sent
    #[error("{0}")]
    Refused(String),

    #[error("{}", api_message(.source, .fallback))]
    Api {
        source: ApiError,
        fallback: &'static str,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn api_message(source: &ApiError, fallback: &str) -> String {
    source.display_message(fallback)
}

impl ViewError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ViewError::Api { source, .. } if source.is_unauthorized())
    }
}

/// Attach the view's failure text to a backend error
pub trait OrFail<T> {
    fn or_fail(self, fallback: &'static str) -> Result<T, ViewError>;
}

impl<T> OrFail<T> for Result<T, ApiError> {
    fn or_fail(self, fallback: &'static str) -> Result<T, ViewError> {
        self.map_err(|source| ViewError::Api { source, fallback })
    }
}

/// Settle a view's initial fetches. Any failure fails the whole load: an
/// authentication failure propagates, anything else becomes a visible notice
/// and the view renders with empty data.
pub fn settle<T: Default>(
    loaded: Result<T, ApiError>,
    fallback: &str,
    notices: &mut Vec<String>,
) -> Result<T, ApiError> {
    match loaded {
        Ok(value) => Ok(value),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
        Err(e) => {
            tracing::warn!(error = %e, "view load failed");
            notices.push(e.display_message(fallback));
            Ok(T::default())
        }
    }
}

/// Badge class shown next to an application status
pub fn status_badge(status: &str) -> &'static str {
    match status {
        "SHORTLISTED" => "success",
        "REJECTED" => "danger",
        "APPLIED" => "warning",
        _ => "primary",
    }
}

/// Accumulates the text of one rendered screen
#[derive(Debug, Default)]
pub struct Screen {
    out: String,
}

impl Screen {
    pub fn new(title: &str) -> Self {
        let mut screen = Self::default();
        screen.line(title);
        screen.line(&"=".repeat(title.chars().count()));
        screen
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self.out.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    pub fn section(&mut self, title: &str) -> &mut Self {
        self.blank();
        self.line(title);
        self.line(&"-".repeat(title.chars().count()))
    }

    pub fn stat(&mut self, label: &str, value: impl std::fmt::Display) -> &mut Self {
        let _ = writeln!(self.out, "  {:<24} {}", label, value);
        self
    }

    pub fn notices(&mut self, notices: &[String]) -> &mut Self {
        for n in notices {
            let _ = writeln!(self.out, "! {}", n);
        }
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Shorten to `max` characters, marking the cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

/// Render an optional field, with a placeholder when absent
pub fn or_unset(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => "Not set",
    }
}

/// Dates arrive as ISO strings, sometimes with a time part; show only the day
pub fn day(value: &Option<String>) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.get(..10).unwrap_or(v).to_string(),
        _ => "-".to_string(),
    }
}
