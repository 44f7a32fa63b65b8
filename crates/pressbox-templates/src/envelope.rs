//! Per-request render data.

use crate::error::TemplateError;
use serde::Serialize;
use tera::{Context, Value};

/// Data handed to a page template.
///
/// The common fields are available in every template under fixed names:
///
/// | Name | Type |
/// |---|---|
/// | `current_year` | number |
/// | `flash` | string or null |
/// | `form` | object or null |
/// | `is_authenticated` | bool |
/// | `csrf_token` | string or null |
///
/// Page-specific data is added with [`RenderEnvelope::with_payload`].
///
/// ```
/// use pressbox_templates::RenderEnvelope;
///
/// let envelope = RenderEnvelope::new(2024)
///     .with_flash(Some("Saved".to_string()))
///     .with_payload("items", &vec!["a", "b"])
///     .unwrap();
/// let context = envelope.to_context();
/// assert!(context.contains_key("items"));
/// assert!(context.contains_key("flash"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RenderEnvelope {
    current_year: i32,
    flash: Option<String>,
    form: Value,
    is_authenticated: bool,
    csrf_token: Option<String>,
    payload: Context,
}

impl RenderEnvelope {
    /// An envelope with only the year set.
    #[must_use]
    pub fn new(current_year: i32) -> Self {
        Self {
            current_year,
            ..Self::default()
        }
    }

    /// Sets the one-shot flash message.
    pub fn with_flash(mut self, flash: Option<String>) -> Self {
        self.flash = flash;
        self
    }

    /// Sets whether the request is authenticated.
    pub fn with_authenticated(mut self, is_authenticated: bool) -> Self {
        self.is_authenticated = is_authenticated;
        self
    }

    /// Sets the anti-forgery token embedded in forms.
    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }

    /// Sets the form state (submitted values and field errors).
    pub fn with_form<T: Serialize + ?Sized>(mut self, form: &T) -> Result<Self, TemplateError> {
        self.form = serde_json::to_value(form).map_err(|error| TemplateError::Context {
            key: "form".to_string(),
            message: error.to_string(),
        })?;
        Ok(self)
    }

    /// Adds page data under `key`.
    pub fn with_payload<T: Serialize + ?Sized>(
        mut self,
        key: &str,
        value: &T,
    ) -> Result<Self, TemplateError> {
        self.payload
            .try_insert(key, value)
            .map_err(|error| TemplateError::Context {
                key: key.to_string(),
                message: error.to_string(),
            })?;
        Ok(self)
    }

    /// The flash message, if any.
    #[must_use]
    pub fn flash(&self) -> Option<&str> {
        self.flash.as_deref()
    }

    /// Builds the template context. Common fields shadow payload keys.
    #[must_use]
    pub fn to_context(&self) -> Context {
        let mut context = self.payload.clone();
        context.insert("current_year", &self.current_year);
        context.insert("flash", &self.flash);
        context.insert("form", &self.form);
        context.insert("is_authenticated", &self.is_authenticated);
        context.insert("csrf_token", &self.csrf_token);
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Form {
        title: String,
    }

    #[test]
    fn test_defaults_are_null() {
        let context = RenderEnvelope::new(2024).to_context().into_json();
        assert_eq!(context["current_year"], 2024);
        assert!(context["flash"].is_null());
        assert!(context["form"].is_null());
        assert!(context["csrf_token"].is_null());
        assert_eq!(context["is_authenticated"], false);
    }

    #[test]
    fn test_form_and_payload() {
        let context = RenderEnvelope::new(2024)
            .with_form(&Form {
                title: "draft".into(),
            })
            .unwrap()
            .with_payload("item", &serde_json::json!({"id": 4}))
            .unwrap()
            .with_authenticated(true)
            .with_csrf_token(Some("tok".into()))
            .to_context()
            .into_json();

        assert_eq!(context["form"]["title"], "draft");
        assert_eq!(context["item"]["id"], 4);
        assert_eq!(context["is_authenticated"], true);
        assert_eq!(context["csrf_token"], "tok");
    }

    #[test]
    fn test_common_fields_shadow_payload() {
        let context = RenderEnvelope::new(2024)
            .with_payload("current_year", &1999)
            .unwrap()
            .to_context()
            .into_json();
        assert_eq!(context["current_year"], 2024);
    }
}
