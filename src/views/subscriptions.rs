//! Subscription listings, sign-up and invoice download.

use super::forms::{self, Form};
use super::{settle, OrFail, Screen, ViewError};
use crate::api::models::Subscription;
use crate::api::{ApiClient, ApiError};
use crate::session::User;
use serde_json::{Map, Value};
use std::path::Path;

/// Which subscriptions to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Mine,
    All,
    Employee(i64),
    Recruiter(i64),
}

impl Listing {
    pub fn parse(args: &[String]) -> Result<Self, ViewError> {
        match args {
            [] => Ok(Listing::Mine),
            [w] if w == "mine" => Ok(Listing::Mine),
            [w] if w == "all" => Ok(Listing::All),
            [w, id] if w == "employee" => Ok(Listing::Employee(forms::id("employee id", id)?)),
            [w, id] if w == "recruiter" => Ok(Listing::Recruiter(forms::id("recruiter id", id)?)),
            _ => Err(ViewError::Refused(
                "Usage: /subscriptions [mine|all|employee <id>|recruiter <id>]".to_string(),
            )),
        }
    }

    fn title(&self) -> String {
        match self {
            Listing::Mine => "My Subscriptions".to_string(),
            Listing::All => "All Subscriptions".to_string(),
            Listing::Employee(id) => format!("Subscriptions of employee {}", id),
            Listing::Recruiter(id) => format!("Subscriptions of recruiter {}", id),
        }
    }
}

pub struct SubscriptionList {
    pub listing: Listing,
    pub items: Vec<Subscription>,
    pub notices: Vec<String>,
}

impl SubscriptionList {
    pub fn load(client: &ApiClient, user: &User, listing: Listing) -> Result<Self, ApiError> {
        let subs = client.subscriptions();
        let loaded = match &listing {
            Listing::Mine => subs.by_user_email(&user.email),
            Listing::All => subs.all(),
            Listing::Employee(id) => subs.by_employee(*id),
            Listing::Recruiter(id) => subs.by_recruiter(*id),
        };
        let mut notices = Vec::new();
        let items = settle(loaded, "Error fetching subscriptions", &mut notices)?;
        Ok(Self {
            listing,
            items,
            notices,
        })
    }

    pub fn render(&self) -> String {
        let mut screen = Screen::new(&self.listing.title());
        screen.notices(&self.notices);
        screen.blank();
        if self.items.is_empty() {
            screen.line("No subscriptions found");
        }
        for sub in &self.items {
            let id = sub
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "?".to_string());
            screen.line(&format!("  Subscription #{}", id));
            for (key, value) in &sub.fields {
                let shown = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => "-".to_string(),
                    other => other.to_string(),
                };
                screen.line(&format!("      {}: {}", key, shown));
            }
        }
        screen.blank();
        screen.line("Subscribe: /subscribe key=value ...   Invoice: /invoice <id> <file>");
        screen.finish()
    }
}

/// Interpret a form value as the JSON scalar it looks like. Numbers are only
/// taken when they print back as the same text, so `007` or a long account
/// number stays a string.
fn scalar(raw: &str) -> Value {
    let number = raw
        .parse::<i64>()
        .map(Value::from)
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from)
        });
    if let Some(n) = number {
        if n.to_string() == raw {
            return n;
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

pub fn create(client: &ApiClient, form: &Form) -> Result<String, ViewError> {
    if form.is_empty() {
        return Err(ViewError::Refused(
            "Usage: /subscribe key=value ...".to_string(),
        ));
    }
    let fields: Map<String, Value> = form
        .iter()
        .map(|(k, v)| (k.to_string(), scalar(v)))
        .collect();
    client
        .subscriptions()
        .create(&fields)
        .or_fail("Failed to create subscription")?;
    Ok("Subscription created successfully!".to_string())
}

/// Download an invoice and write it to `out`
pub fn invoice(client: &ApiClient, id: &str, out: &Path) -> Result<String, ViewError> {
    let id = forms::id("subscription id", id)?;
    let bytes = client
        .subscriptions()
        .invoice(id)
        .or_fail("Failed to download invoice")?;
    std::fs::write(out, &bytes).map_err(|source| ViewError::Io {
        path: out.to_path_buf(),
        source,
    })?;
    Ok(format!(
        "Invoice {} saved to {} ({} bytes)",
        id,
        out.display(),
        bytes.len()
    ))
}
