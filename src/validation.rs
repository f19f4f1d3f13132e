use std::fmt;

use url::Url;

pub const REQUIRED: &str = "This field is required.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every constraint violation found in one submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[cfg(test)]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join("; "))
    }
}

/// Collects field constraint violations for a form.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
        self
    }

    /// Blank (whitespace only) counts as missing.
    pub fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, REQUIRED);
        }
        self
    }

    pub fn required_list(&mut self, field: &'static str, values: &[String]) -> &mut Self {
        if values.iter().all(|v| v.trim().is_empty()) {
            self.add(field, REQUIRED);
        }
        self
    }

    pub fn max_length(&mut self, field: &'static str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value
            && value.chars().count() > max
        {
            self.add(
                field,
                format!("Field cannot be longer than {} characters.", max),
            );
        }
        self
    }

    /// Optional link; only checked when present and non-blank.
    pub fn url(&mut self, field: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            match Url::parse(value) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                _ => {
                    self.add(field, "Invalid URL.");
                }
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}
