//! Form validation.
//!
//! A [`Validator`] collects one message per field plus any number of
//! messages that belong to the form as a whole. Forms embed it so the
//! template can show each message next to its input:
//!
//! ```text
//! {% if form.validator.field_errors.title %}
//!   <label class="error">{{ form.validator.field_errors.title }}</label>
//! {% endif %}
//! ```

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Collected validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validator {
    field_errors: BTreeMap<String, String>,
    non_field_errors: Vec<String>,
}

impl Validator {
    /// A validator with no messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no message has been recorded.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Records a message for `field`. The first message per field wins.
    pub fn add_field_error(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Records a message about the whole form.
    pub fn add_non_field_error(&mut self, message: impl Into<String>) {
        self.non_field_errors.push(message.into());
    }

    /// Records `message` for `field` unless `ok` holds.
    pub fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_field_error(field, message);
        }
    }

    /// The message recorded for `field`.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    /// Messages about the whole form.
    #[must_use]
    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }
}

/// Whether `value` contains something other than whitespace.
#[must_use]
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Whether `value` has at most `limit` characters.
#[must_use]
pub fn max_chars(value: &str, limit: usize) -> bool {
    value.chars().count() <= limit
}

/// Whether `value` has at least `limit` characters.
#[must_use]
pub fn min_chars(value: &str, limit: usize) -> bool {
    value.chars().count() >= limit
}

/// Whether `value` is one of `permitted`.
#[must_use]
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// Whether `value` looks like an email address with a top-level domain.
#[must_use]
pub fn matches_email(value: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(
                r"^[a-zA-Z0-9]([a-zA-Z0-9._%+-]*[a-zA-Z0-9])?@[a-zA-Z0-9]([a-zA-Z0-9.-]*[a-zA-Z0-9])?\.[a-zA-Z]{2,}$",
            )
            .ok()
        })
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}
