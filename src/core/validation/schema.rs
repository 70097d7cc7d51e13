//! Static field tables for form validation
//!
//! A [`FormSchema`] is built once, when the form view is configured, and
//! validation runs data-driven over its [`FieldSpec`] entries. The HTTP verb of
//! the submission selects the [`ValidationMode`].

use super::validators;
use crate::core::error::{HalError, HalResult, ValidationErrors};
use crate::core::field::FieldFormat;
use axum::http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Sanitized submission: internal field name -> parsed value
pub type CleanData = Map<String, Value>;

/// Custom single-value validator
pub type Validator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Value filter applied before validation
pub type Filter = Arc<dyn Fn(&str, Value) -> Value + Send + Sync>;

/// Reason reported for an absent required field
pub const REQUIRED_REASON: &str = "This field is required";

/// Reason reported for a field the schema does not declare (strict forms only)
pub const UNKNOWN_REASON: &str = "Unknown field";

/// JSON type accepted by a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Any,
}

impl FieldType {
    /// Check the JSON type and normalize the value (`3.0` becomes `3` for integers)
    fn parse(&self, value: Value) -> Result<Value, String> {
        match self {
            FieldType::String if value.is_string() => Ok(value),
            FieldType::String => Err("Value must be a string".to_string()),
            FieldType::Integer => {
                if value.is_i64() || value.is_u64() {
                    return Ok(value);
                }
                match value.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(json!(f as i64))
                    }
                    _ => Err("Value must be an integer".to_string()),
                }
            }
            FieldType::Float if value.is_number() => Ok(value),
            FieldType::Float => Err("Value must be a number".to_string()),
            FieldType::Boolean if value.is_boolean() => Ok(value),
            FieldType::Boolean => Err("Value must be a boolean".to_string()),
            FieldType::Any => Ok(value),
        }
    }

    fn schema_type(&self) -> Option<&'static str> {
        match self {
            FieldType::String => Some("string"),
            FieldType::Integer => Some("integer"),
            FieldType::Float => Some("number"),
            FieldType::Boolean => Some("boolean"),
            FieldType::Any => None,
        }
    }
}

/// A range or shape constraint on a field value
#[derive(Clone)]
enum Rule {
    Min(f64),
    Max(f64),
    Length { min: usize, max: usize },
    OneOf(Vec<String>),
    Date(&'static str),
    Format(FieldFormat),
    Custom(Validator),
}

impl Rule {
    fn check(&self, field: &str, value: &Value) -> Result<(), String> {
        match self {
            Rule::Min(min) => validators::min_value(*min)(field, value),
            Rule::Max(max) => validators::max_value(*max)(field, value),
            Rule::Length { min, max } => validators::string_length(*min, *max)(field, value),
            Rule::OneOf(allowed) => validators::in_list(allowed.clone())(field, value),
            Rule::Date(format) => validators::date_format(*format)(field, value),
            Rule::Format(format) => validators::string_format(format.clone())(field, value),
            Rule::Custom(validator) => validator(field, value),
        }
    }

    fn describe(&self, property: &mut Map<String, Value>) {
        match self {
            Rule::Min(min) => {
                property.insert("minimum".to_string(), json!(min));
            }
            Rule::Max(max) => {
                property.insert("maximum".to_string(), json!(max));
            }
            Rule::Length { min, max } => {
                property.insert("minLength".to_string(), json!(min));
                property.insert("maxLength".to_string(), json!(max));
            }
            Rule::OneOf(allowed) => {
                property.insert("enum".to_string(), json!(allowed));
            }
            Rule::Date(_) => {
                property.insert("format".to_string(), json!("date"));
            }
            Rule::Format(FieldFormat::Custom(regex)) => {
                property.insert("pattern".to_string(), json!(regex.as_str()));
            }
            Rule::Format(format) => {
                property.insert("format".to_string(), json!(format.name()));
            }
            Rule::Custom(_) => {}
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Min(min) => write!(f, "Min({})", min),
            Rule::Max(max) => write!(f, "Max({})", max),
            Rule::Length { min, max } => write!(f, "Length({}..={})", min, max),
            Rule::OneOf(allowed) => write!(f, "OneOf({:?})", allowed),
            Rule::Date(format) => write!(f, "Date({})", format),
            Rule::Format(format) => write!(f, "Format({})", format.name()),
            Rule::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Declaration of one form field
///
/// # Example
///
/// ```rust,ignore
/// let score = FieldSpec::integer("score").required().min(1.0);
/// let title = FieldSpec::string("title").maps_to("name").filter(filters::trim());
/// ```
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    internal: Option<String>,
    required: bool,
    field_type: FieldType,
    rules: Vec<Rule>,
    filters: Vec<Filter>,
    description: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            internal: None,
            required: false,
            field_type,
            rules: Vec::new(),
            filters: Vec::new(),
            description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Any)
    }

    /// Must be present (and non-null) on full validation
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Store the cleaned value under a different (internal) name
    pub fn maps_to(mut self, internal: impl Into<String>) -> Self {
        self.internal = Some(internal.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.rules.push(Rule::Min(min));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.rules.push(Rule::Max(max));
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.rules.push(Rule::Length { min, max });
        self
    }

    pub fn one_of<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .push(Rule::OneOf(allowed.into_iter().map(Into::into).collect()));
        self
    }

    pub fn date(mut self, format: &'static str) -> Self {
        self.rules.push(Rule::Date(format));
        self
    }

    pub fn format(mut self, format: FieldFormat) -> Self {
        self.rules.push(Rule::Format(format));
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push(Rule::Custom(Arc::new(validator)));
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, Value) -> Value + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Externally exposed name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the cleaned value is stored under
    pub fn internal_name(&self) -> &str {
        self.internal.as_deref().unwrap_or(&self.name)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Filter, type-check and validate one submitted value
    ///
    /// Returns the cleaned value or the first failure reason.
    pub fn validate(&self, value: Value) -> Result<Value, String> {
        let value = self
            .filters
            .iter()
            .fold(value, |value, filter| filter(&self.name, value));

        if value.is_null() {
            return if self.required {
                Err(REQUIRED_REASON.to_string())
            } else {
                Ok(Value::Null)
            };
        }

        let value = self.field_type.parse(value)?;
        for rule in &self.rules {
            rule.check(&self.name, &value)?;
        }
        Ok(value)
    }

    fn json_schema(&self) -> Value {
        let mut property = Map::new();
        if let Some(kind) = self.field_type.schema_type() {
            property.insert("type".to_string(), json!(kind));
        }
        for rule in &self.rules {
            rule.describe(&mut property);
        }
        if let Some(description) = &self.description {
            property.insert("description".to_string(), json!(description));
        }
        Value::Object(property)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("internal", &self.internal)
            .field("required", &self.required)
            .field("field_type", &self.field_type)
            .field("rules", &self.rules)
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// What to do with payload keys the schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    #[default]
    Ignore,
    Reject,
}

/// Full or partial validation, selected by the HTTP verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every required field must be present and valid (POST, PUT)
    Full,
    /// Only supplied fields are checked (PATCH)
    Partial,
}

impl ValidationMode {
    pub fn for_method(method: &Method) -> HalResult<Self> {
        if *method == Method::POST || *method == Method::PUT {
            Ok(ValidationMode::Full)
        } else if *method == Method::PATCH {
            Ok(ValidationMode::Partial)
        } else {
            Err(HalError::MethodNotAllowed {
                method: method.to_string(),
            })
        }
    }
}

/// Outcome of validating one submission
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Cleaned values keyed by internal field name
    pub clean: CleanData,
    /// Every failure, in schema order
    pub errors: ValidationErrors,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The cleaned data, or the accumulated errors
    pub fn into_result(self) -> HalResult<CleanData> {
        if self.errors.is_empty() {
            Ok(self.clean)
        } else {
            Err(HalError::Validation(self.errors))
        }
    }
}

/// Field table of a form
#[derive(Debug, Clone)]
pub struct FormSchema {
    title: String,
    fields: Vec<FieldSpec>,
    unknown_fields: UnknownFields,
}

impl FormSchema {
    pub fn builder(title: impl Into<String>) -> FormSchemaBuilder {
        FormSchemaBuilder {
            title: title.into(),
            fields: Vec::new(),
            unknown_fields: UnknownFields::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn unknown_fields(&self) -> UnknownFields {
        self.unknown_fields
    }

    /// Copy of this schema with another unknown-field policy
    pub fn with_unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Validate a payload, accumulating every field failure
    pub fn validate(&self, payload: &Map<String, Value>, mode: ValidationMode) -> ValidationResult {
        let mut result = ValidationResult::default();

        for spec in &self.fields {
            match payload.get(spec.name()) {
                None => {
                    if mode == ValidationMode::Full && spec.is_required() {
                        result.errors.push(spec.name(), REQUIRED_REASON);
                    }
                }
                Some(value) => match spec.validate(value.clone()) {
                    Ok(clean) => {
                        result.clean.insert(spec.internal_name().to_string(), clean);
                    }
                    Err(reason) => result.errors.push(spec.name(), reason),
                },
            }
        }

        if self.unknown_fields == UnknownFields::Reject {
            for key in payload.keys() {
                if self.field(key).is_none() {
                    result.errors.push(key.clone(), UNKNOWN_REASON);
                }
            }
        }

        result
    }

    /// Full-document validation (create)
    pub fn validate_full(&self, payload: &Map<String, Value>) -> ValidationResult {
        self.validate(payload, ValidationMode::Full)
    }

    /// Partial-document validation (update)
    pub fn validate_partial(&self, payload: &Map<String, Value>) -> ValidationResult {
        self.validate(payload, ValidationMode::Partial)
    }

    /// JSON schema (draft-04) describing the field table
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|spec| (spec.name().to_string(), spec.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|spec| spec.is_required())
            .map(FieldSpec::name)
            .collect();

        let mut schema = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "title": self.title,
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        if self.unknown_fields == UnknownFields::Reject {
            schema["additionalProperties"] = json!(false);
        }
        schema
    }
}

/// Builder checking the field table once, at configuration time
pub struct FormSchemaBuilder {
    title: String,
    fields: Vec<FieldSpec>,
    unknown_fields: UnknownFields,
}

impl FormSchemaBuilder {
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Shorthand for rejecting undeclared fields
    pub fn strict(self) -> Self {
        self.unknown_fields(UnknownFields::Reject)
    }

    pub fn build(self) -> HalResult<FormSchema> {
        let mut names = HashSet::new();
        let mut internals = HashSet::new();
        for spec in &self.fields {
            if spec.name().is_empty() {
                return Err(HalError::Config(format!(
                    "form '{}' declares a field with an empty name",
                    self.title
                )));
            }
            if !names.insert(spec.name()) {
                return Err(HalError::Config(format!(
                    "form '{}' declares field '{}' twice",
                    self.title,
                    spec.name()
                )));
            }
            if !internals.insert(spec.internal_name()) {
                return Err(HalError::Config(format!(
                    "form '{}' maps two fields to '{}'",
                    self.title,
                    spec.internal_name()
                )));
            }
        }

        Ok(FormSchema {
            title: self.title,
            fields: self.fields,
            unknown_fields: self.unknown_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::filters;

    fn workout_schema() -> FormSchema {
        FormSchema::builder("Workout")
            .field(FieldSpec::integer("score").required().min(1.0))
            .field(
                FieldSpec::string("title")
                    .maps_to("name")
                    .filter(filters::trim())
                    .length(1, 100),
            )
            .build()
            .unwrap()
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_full_validation_requires_required_fields() {
        let result = workout_schema().validate_full(&payload(json!({"title": "Run"})));
        assert!(!result.is_valid());
        assert_eq!(result.errors.get("score"), Some(REQUIRED_REASON));
    }

    #[test]
    fn test_partial_validation_skips_absent_fields() {
        let result = workout_schema().validate_partial(&payload(json!({"title": "Run"})));
        assert!(result.is_valid());
        assert_eq!(result.clean.len(), 1);
        assert_eq!(result.clean["name"], "Run");
    }

    #[test]
    fn test_out_of_range_value_fails_in_both_modes() {
        let schema = workout_schema();
        for mode in [ValidationMode::Full, ValidationMode::Partial] {
            let result = schema.validate(&payload(json!({"score": 0})), mode);
            assert_eq!(result.errors.get("score"), Some("Value must be at least 1"));
        }
    }

    #[test]
    fn test_errors_are_accumulated() {
        let result = workout_schema().validate_full(&payload(json!({"title": 12})));
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors.get("score"), Some(REQUIRED_REASON));
        assert_eq!(result.errors.get("title"), Some("Value must be a string"));
    }

    #[test]
    fn test_clean_uses_internal_names_and_filters() {
        let result =
            workout_schema().validate_full(&payload(json!({"score": 3, "title": "  Run  "})));
        assert!(result.is_valid());
        assert_eq!(result.clean["score"], 3);
        assert_eq!(result.clean["name"], "Run");
        assert!(!result.clean.contains_key("title"));
    }

    #[test]
    fn test_integer_normalization() {
        let result = workout_schema().validate_full(&payload(json!({"score": 4.0})));
        assert_eq!(result.clean["score"], json!(4));

        let result = workout_schema().validate_full(&payload(json!({"score": 4.5})));
        assert_eq!(result.errors.get("score"), Some("Value must be an integer"));
    }

    #[test]
    fn test_null_handling() {
        let schema = workout_schema();
        let result = schema.validate_partial(&payload(json!({"score": null})));
        assert_eq!(result.errors.get("score"), Some(REQUIRED_REASON));

        let result = schema.validate_partial(&payload(json!({"title": null})));
        assert!(result.is_valid());
        assert_eq!(result.clean["name"], Value::Null);
    }

    #[test]
    fn test_unknown_fields_policy() {
        let loose = workout_schema();
        let result = loose.validate_full(&payload(json!({"score": 2, "secret": "x"})));
        assert!(result.is_valid());
        assert!(!result.clean.contains_key("secret"));

        let strict = workout_schema().with_unknown_fields(UnknownFields::Reject);
        let result = strict.validate_full(&payload(json!({"score": 2, "secret": "x"})));
        assert_eq!(result.errors.get("secret"), Some(UNKNOWN_REASON));
    }

    #[test]
    fn test_custom_validator() {
        let schema = FormSchema::builder("Even")
            .field(FieldSpec::integer("n").validator(|_, v| {
                if v.as_i64().unwrap_or_default() % 2 == 0 {
                    Ok(())
                } else {
                    Err("Value must be even".to_string())
                }
            }))
            .build()
            .unwrap();
        assert!(schema.validate_full(&payload(json!({"n": 4}))).is_valid());
        let result = schema.validate_full(&payload(json!({"n": 3})));
        assert_eq!(result.errors.get("n"), Some("Value must be even"));
    }

    #[test]
    fn test_build_rejects_duplicates() {
        let err = FormSchema::builder("Dup")
            .field(FieldSpec::string("a"))
            .field(FieldSpec::string("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, HalError::Config(_)));

        let err = FormSchema::builder("Dup")
            .field(FieldSpec::string("a").maps_to("x"))
            .field(FieldSpec::string("b").maps_to("x"))
            .build()
            .unwrap_err();
        assert!(matches!(err, HalError::Config(_)));
    }

    #[test]
    fn test_mode_for_method() {
        assert_eq!(
            ValidationMode::for_method(&Method::POST).unwrap(),
            ValidationMode::Full
        );
        assert_eq!(
            ValidationMode::for_method(&Method::PUT).unwrap(),
            ValidationMode::Full
        );
        assert_eq!(
            ValidationMode::for_method(&Method::PATCH).unwrap(),
            ValidationMode::Partial
        );
        assert!(ValidationMode::for_method(&Method::DELETE).is_err());
    }

    #[test]
    fn test_json_schema() {
        let schema = workout_schema().json_schema();
        assert_eq!(schema["title"], "Workout");
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["score"]["type"], "integer");
        assert_eq!(schema["properties"]["score"]["minimum"], json!(1.0));
        assert_eq!(schema["properties"]["title"]["maxLength"], 100);
        assert_eq!(schema["required"], json!(["score"]));
        assert!(schema.get("additionalProperties").is_none());
    }

    #[test]
    fn test_into_result() {
        let ok = workout_schema().validate_full(&payload(json!({"score": 1})));
        assert_eq!(ok.into_result().unwrap()["score"], 1);

        let err = workout_schema().validate_full(&payload(json!({})));
        assert!(matches!(err.into_result(), Err(HalError::Validation(_))));
    }
}
