//! Append-only JSONL record of what happened during a run.
//!
//! One file per run, one event per line. Credentials are never written.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::warn;

pub type SharedJournal = Rc<RefCell<Journal>>;

pub struct Journal {
    pub path: Option<PathBuf>,
    run_id: String,
    file: Option<File>,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    run_id: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Journal {
    /// Open `<dir>/<run_id>.jsonl` for appending, creating `dir` if needed
    pub fn open(dir: &Path, run_id: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.jsonl", run_id));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path: Some(path),
            run_id: run_id.to_string(),
            file: Some(file),
        })
    }

    /// A journal that accepts events and drops them
    pub fn disabled(run_id: &str) -> Self {
        Self {
            path: None,
            run_id: run_id.to_string(),
            file: None,
        }
    }

    pub fn shared(self) -> SharedJournal {
        Rc::new(RefCell::new(self))
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        let event = Event {
            ts: Utc::now(),
            run_id: &self.run_id,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }

    /// Like `log`, but a write failure is only reported as a warning
    pub fn record(&mut self, event_type: &str, data: serde_json::Value) {
        if let Err(e) = self.log(event_type, data) {
            warn!(error = %e, event = event_type, "failed to write journal event");
        }
    }

    pub fn login(&mut self, email: &str, role: &str) {
        self.record("login", serde_json::json!({ "email": email, "role": role }));
    }

    pub fn logout(&mut self) {
        self.record("logout", serde_json::json!({}));
    }

    pub fn session_expired(&mut self, method: &str, path: &str) {
        self.record(
            "session_expired",
            serde_json::json!({ "method": method, "path": path }),
        );
    }

    pub fn navigation(&mut self, requested: &str, shown: &str, decision: &str) {
        self.record(
            "navigation",
            serde_json::json!({
                "requested": requested,
                "shown": shown,
                "decision": decision,
            }),
        );
    }

    pub fn request_failed(&mut self, method: &str, path: &str, status: Option<u16>) {
        self.record(
            "request_failed",
            serde_json::json!({
                "method": method,
                "path": path,
                "status": status,
            }),
        );
    }
}
