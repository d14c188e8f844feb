//! Form input: `key=value` parsing and the local checks run before anything
//! is sent to the backend.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(String),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("{field} must be a date in YYYY-MM-DD form, got '{value}'")]
    InvalidDate { field: String, value: String },
    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: String, value: String },
    #[error("expected key=value, got '{0}'")]
    Malformed(String),
    #[error("unknown field '{field}'; expected one of: {expected}")]
    UnknownField { field: String, expected: String },
    #[error("{field} must be one of: {expected}")]
    NotAllowed { field: String, expected: String },
}

/// Submitted form values keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    values: BTreeMap<String, String>,
}

impl Form {
    /// Parse `key=value` words (already shell-split)
    pub fn parse<S: AsRef<str>>(words: &[S]) -> Result<Self, FormError> {
        let mut values = BTreeMap::new();
        for word in words {
            let word = word.as_ref();
            let Some((key, value)) = word.split_once('=') else {
                return Err(FormError::Malformed(word.to_string()));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(FormError::Malformed(word.to_string()));
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    /// Reject any field not in `allowed`
    pub fn only(&self, allowed: &[&str]) -> Result<(), FormError> {
        match self.values.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(field) => Err(FormError::UnknownField {
                field: field.clone(),
                expected: allowed.join(", "),
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn required(&self, key: &str) -> Result<String, FormError> {
        require(key, self.get(key).unwrap_or(""))
    }

    pub fn or(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => default.to_string(),
        }
    }
}

pub fn require(field: &str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Missing(field.to_string()))
    } else {
        Ok(value.to_string())
    }
}

pub fn email(value: &str) -> Result<String, FormError> {
    let value = require("email", value)?;
    if EMAIL_RE.is_match(&value) {
        Ok(value)
    } else {
        Err(FormError::InvalidEmail(value))
    }
}

pub fn date(field: &str, value: &str) -> Result<NaiveDate, FormError> {
    let value = require(field, value)?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| FormError::InvalidDate {
        field: field.to_string(),
        value,
    })
}

pub fn id(field: &str, value: &str) -> Result<i64, FormError> {
    let value = require(field, value)?;
    value.parse().map_err(|_| FormError::InvalidNumber {
        field: field.to_string(),
        value,
    })
}

pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<String, FormError> {
    let value = require(field, value)?;
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(FormError::NotAllowed {
            field: field.to_string(),
            expected: allowed.join(", "),
        })
    }
}
