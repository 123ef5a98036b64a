//! JSON Schema validation for project configuration files.
//!
//! The project configuration schema is embedded at compile time from
//! `schemas/project-config.json`. Validation runs on the raw JSON before
//! deserialization so every problem is reported at once, not just the first
//! one serde trips over.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use surveyimport::validation::validate_project_config;
//!
//! let config = json!({ "survey_title": { "en": "Survey" } });
//! assert!(validate_project_config(&config).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static PROJECT_CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/project-config.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every error otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a project configuration document.
pub fn validate_project_config(data: &Value) -> Result<(), Vec<String>> {
    validate(&PROJECT_CONFIG_SCHEMA, data)
}

/// Quick check against the project configuration schema.
pub fn is_valid_project_config(data: &Value) -> bool {
    is_valid(&PROJECT_CONFIG_SCHEMA, data)
}
