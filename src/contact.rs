// Contact and newsletter form validation. All fields must pass before anything is sent.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

pub const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    #[validate(custom(function = "name_present"))]
    pub name: String,
    #[validate(
        custom(function = "email_present"),
        email(message = "Please enter a valid email address.")
    )]
    pub email: String,
    pub subject: String,
    #[validate(
        custom(function = "message_present"),
        length(max = 5000, message = "Message must be at most 5000 characters.")
    )]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct NewsletterForm {
    #[validate(
        custom(function = "email_present"),
        email(message = "Please enter a valid email address.")
    )]
    pub email: String,
}

fn required(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required").with_message(Cow::Borrowed(message)))
    } else {
        Ok(())
    }
}

fn name_present(value: &str) -> Result<(), ValidationError> {
    required(value, "Please enter your name.")
}

fn email_present(value: &str) -> Result<(), ValidationError> {
    required(value, "Please enter your email address.")
}

fn message_present(value: &str) -> Result<(), ValidationError> {
    required(value, "Please enter a message.")
}

/// Field name -> inline message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(pub BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

/// One message per field; a missing value wins over a malformed one.
impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = BTreeMap::new();
        for (field, errs) in errors.field_errors() {
            let chosen = errs
                .iter()
                .find(|e| e.code == "required")
                .or_else(|| errs.first());
            if let Some(e) = chosen {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                out.insert(field.to_string(), message);
            }
        }
        Self(out)
    }
}

pub fn validate_contact(form: &ContactForm) -> Result<(), FieldErrors> {
    form.validate().map_err(FieldErrors::from)
}

pub fn validate_newsletter(form: &NewsletterForm) -> Result<(), FieldErrors> {
    form.validate().map_err(FieldErrors::from)
}
