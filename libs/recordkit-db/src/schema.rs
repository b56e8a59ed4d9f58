//! Validation-schema triple: create / update / filter schemas bound to one
//! record type.
//!
//! The triple arrives as one JSON document and is compiled exactly once at
//! bind time. Binding problems (name mismatch, missing sub-schema, a
//! sub-schema that is not schema-shaped) are configuration errors raised at
//! setup, never at call time, and they abort the whole bind: no handlers
//! are constructed on a partial triple.

use jsonschema::JSONSchema;
use serde_json::Value;

use recordkit_filter::Document;

use crate::error::{Error, Result, Violation};

const SUB_SCHEMAS: [&str; 3] = ["create", "update", "filter"];

/// Compiled create/update/filter validators for one record type.
#[derive(Debug)]
pub struct SchemaSet {
    record: String,
    create: JSONSchema,
    update: JSONSchema,
    filter: JSONSchema,
}

impl SchemaSet {
    /// Bind a schema document of the form
    /// `{"name": "...", "create": {...}, "update": {...}, "filter": {...}}`
    /// to the record type named `record`.
    ///
    /// # Errors
    /// Returns [`Error::Binding`] when the declared name differs from
    /// `record`, when any of the three sub-schemas is absent, or when a
    /// sub-schema is not a compilable schema object.
    pub fn bind(record: &str, doc: &Value) -> Result<Self> {
        let binding = |reason: String| Error::Binding {
            record: record.to_owned(),
            reason,
        };

        let Some(obj) = doc.as_object() else {
            return Err(binding("schema document must be a JSON object".to_owned()));
        };

        let declared = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| binding("schema document is missing a declared name".to_owned()))?;
        if declared != record {
            return Err(binding(format!(
                "declared name '{declared}' does not match record type '{record}'"
            )));
        }

        let missing: Vec<&str> = SUB_SCHEMAS
            .iter()
            .copied()
            .filter(|key| !obj.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(binding(format!("missing sub-schemas: {missing:?}")));
        }

        let compile_sub = |key: &str| -> Result<JSONSchema> {
            let sub = &obj[key];
            if !sub.is_object() {
                return Err(binding(format!(
                    "sub-schema '{key}' must be a schema object, got {sub}"
                )));
            }
            JSONSchema::compile(sub)
                .map_err(|err| binding(format!("sub-schema '{key}' failed to compile: {err}")))
        };

        Ok(Self {
            record: record.to_owned(),
            create: compile_sub("create")?,
            update: compile_sub("update")?,
            filter: compile_sub("filter")?,
        })
    }

    #[must_use]
    pub fn record(&self) -> &str {
        &self.record
    }

    /// Validate a create payload.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] with every field-level violation.
    pub fn validate_create(&self, payload: &Document) -> Result<Document> {
        self.validate(&self.create, payload)
    }

    /// Validate an update payload.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] with every field-level violation.
    pub fn validate_update(&self, payload: &Document) -> Result<Document> {
        self.validate(&self.update, payload)
    }

    /// Validate a filter mapping.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] with every field-level violation.
    pub fn validate_filter(&self, filter: &Document) -> Result<Document> {
        self.validate(&self.filter, filter)
    }

    /// Run one compiled validator. Empty mappings skip validation. On
    /// success the caller gets back the mapping with exactly the fields
    /// that were explicitly provided — schema defaults are never injected,
    /// so an update can never overwrite a column with a default it was not
    /// asked to touch.
    fn validate(&self, schema: &JSONSchema, data: &Document) -> Result<Document> {
        if data.is_empty() {
            return Ok(data.clone());
        }

        let instance = Value::Object(data.clone());
        if let Err(errors) = schema.validate(&instance) {
            let violations = errors
                .map(|err| Violation {
                    path: normalized_pointer(&err.instance_path.to_string()),
                    message: err.to_string(),
                })
                .collect();
            return Err(Error::Validation {
                record: self.record.clone(),
                violations,
            });
        }

        Ok(data.clone())
    }
}

fn normalized_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_owned()
    } else {
        pointer.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_schema_doc() -> Value {
        json!({
            "name": "User",
            "create": {
                "type": "object",
                "required": ["name", "email"],
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "email": {"type": "string", "pattern": "@"},
                    "age": {"type": "integer", "minimum": 0}
                }
            },
            "update": {
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "age": {"type": "integer", "minimum": 0}
                }
            },
            "filter": {"type": "object"}
        })
    }

    fn doc(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn binding_succeeds_on_matching_name() {
        let set = SchemaSet::bind("User", &user_schema_doc()).unwrap();
        assert_eq!(set.record(), "User");
    }

    #[test]
    fn binding_rejects_name_mismatch() {
        // Arrange
        let schema = user_schema_doc();

        // Act
        let err = SchemaSet::bind("Account", &schema).unwrap_err();

        // Assert
        assert!(matches!(err, Error::Binding { record, .. } if record == "Account"));
    }

    #[test]
    fn binding_rejects_missing_sub_schema() {
        let mut schema = user_schema_doc();
        schema.as_object_mut().unwrap().remove("filter");

        let err = SchemaSet::bind("User", &schema).unwrap_err();
        assert!(matches!(err, Error::Binding { reason, .. } if reason.contains("filter")));
    }

    #[test]
    fn binding_rejects_non_schema_sub_schema() {
        let mut schema = user_schema_doc();
        schema.as_object_mut().unwrap()["update"] = json!("not a schema");

        let err = SchemaSet::bind("User", &schema).unwrap_err();
        assert!(matches!(err, Error::Binding { reason, .. } if reason.contains("update")));
    }

    #[test]
    fn validation_failure_carries_field_paths() {
        // Arrange
        let set = SchemaSet::bind("User", &user_schema_doc()).unwrap();
        let payload = doc(json!({"name": "", "email": "nope", "age": -3}));

        // Act
        let err = set.validate_create(&payload).unwrap_err();

        // Assert
        let Error::Validation { violations, .. } = err else {
            panic!("expected a validation error");
        };
        assert!(violations.len() >= 2);
        assert!(violations.iter().any(|v| v.path.contains("name")));
        assert!(violations.iter().any(|v| v.path.contains("age")));
    }

    #[test]
    fn empty_mapping_skips_validation() {
        let set = SchemaSet::bind("User", &user_schema_doc()).unwrap();
        assert!(set.validate_create(&Document::new()).is_ok());
    }

    #[test]
    fn valid_payload_is_forwarded_unchanged() {
        let set = SchemaSet::bind("User", &user_schema_doc()).unwrap();
        let payload = doc(json!({"name": "Ada", "email": "ada@example.com"}));
        let forwarded = set.validate_create(&payload).unwrap();
        assert_eq!(forwarded, payload);
    }
}
