//! Required-field validation for call parameters
//!
//! Provides a small fluent validator and a per-method table of required
//! parameter names.
//!
//! # Example
//!
//! ```rust
//! use restmap_core::validation::{RequiredFields, Validator};
//!
//! let required = RequiredFields::new().with_method("getUser", ["id"]);
//!
//! let result = required.check("getUser", |field| field == "id");
//! assert!(result.is_valid());
//!
//! let result = Validator::new().present("name", false).validate();
//! assert_eq!(result.errors()[0].to_string(), "name param is required");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Validation error for a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Names of the fields that failed, in check order
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.field.clone()).collect()
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }
}

/// Fluent validator builder
#[derive(Debug, Default)]
pub struct Validator {
    result: ValidationResult,
}

impl Validator {
    /// Create a new validator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error when `present` is false
    #[must_use]
    pub fn present(mut self, field: &str, present: bool) -> Self {
        if !present {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "param is required".to_string(),
                code: "REQUIRED".to_string(),
            });
        }
        self
    }

    /// Finish validation
    #[must_use]
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Per-method list of required parameter names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredFields {
    by_method: HashMap<String, Vec<String>>,
}

impl RequiredFields {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to declare the required fields of a method
    #[must_use]
    pub fn with_method<I, S>(mut self, method: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_method
            .insert(method.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Required fields for a method, if any were declared
    #[must_use]
    pub fn for_method(&self, method: &str) -> Option<&[String]> {
        self.by_method.get(method).map(Vec::as_slice)
    }

    /// Whether no method declares required fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty()
    }

    /// Check every required field of `method` with the `is_present` probe
    pub fn check(&self, method: &str, is_present: impl Fn(&str) -> bool) -> ValidationResult {
        let Some(fields) = self.for_method(method) else {
            return ValidationResult::new();
        };

        fields
            .iter()
            .fold(Validator::new(), |v, field| v.present(field, is_present(field)))
            .validate()
    }
}

impl From<HashMap<String, Vec<String>>> for RequiredFields {
    fn from(by_method: HashMap<String, Vec<String>>) -> Self {
        Self { by_method }
    }
}
