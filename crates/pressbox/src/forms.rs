//! Submitted forms and their rules.
//!
//! Each form deserializes from an `application/x-www-form-urlencoded` body
//! (missing fields become empty) and serializes back into the template
//! together with its [`Validator`].

use crate::validator::{matches_email, max_chars, min_chars, not_blank, permitted_value, Validator};
use http_body_util::BodyExt;
use pressbox_core::PressError;
use pressbox_middleware::Request;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Expiry choices offered on the create form, in days.
pub const EXPIRY_CHOICES: [u32; 3] = [1, 7, 365];

/// Longest accepted item title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

const BLANK: &str = "This field cannot be blank";

/// Decodes a urlencoded request body into `T`.
///
/// An undecodable body is a 400 client error.
pub async fn decode_form<T: DeserializeOwned>(request: Request) -> Result<T, PressError> {
    let body = match request.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };
    serde_urlencoded::from_bytes(&body)
        .map_err(|e| PressError::client(format!("undecodable form body: {e}")))
}

/// The create-item form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemCreateForm {
    /// Item title.
    pub title: String,
    /// Item body.
    pub content: String,
    /// Days until expiry.
    pub expires: u32,
    /// Messages from the last check.
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl Default for ItemCreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: 365,
            validator: Validator::new(),
        }
    }
}

impl ItemCreateForm {
    /// Applies the rules and returns whether the form is acceptable.
    pub fn validate(&mut self) -> bool {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", BLANK);
        v.check_field(
            max_chars(&self.title, MAX_TITLE_CHARS),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(not_blank(&self.content), "content", BLANK);
        v.check_field(
            permitted_value(&self.expires, &EXPIRY_CHOICES),
            "expires",
            "This field must equal 1, 7 or 365",
        );
        v.valid()
    }
}

/// The signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSignupForm {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Chosen password. Never sent back to the template.
    #[serde(skip_serializing)]
    pub password: String,
    /// Messages from the last check.
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl UserSignupForm {
    /// Applies the rules and returns whether the form is acceptable.
    pub fn validate(&mut self) -> bool {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.name), "name", BLANK);
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(
            matches_email(&self.email),
            "email",
            "This field must be a valid email address",
        );
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.check_field(
            min_chars(&self.password, MIN_PASSWORD_CHARS),
            "password",
            "This field must be at least 8 characters long",
        );
        v.valid()
    }
}

/// The login form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserLoginForm {
    /// Email address.
    pub email: String,
    /// Password. Never sent back to the template.
    #[serde(skip_serializing)]
    pub password: String,
    /// Messages from the last check.
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl UserLoginForm {
    /// Applies the rules and returns whether the form is acceptable.
    pub fn validate(&mut self) -> bool {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(
            matches_email(&self.email),
            "email",
            "This field must be a valid email address",
        );
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.valid()
    }
}
