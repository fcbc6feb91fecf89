//! Schema validation of converted input.

use crate::{error::ValidationError, schema::Schema, value::Value};

/// Fields that passed validation, in schema declaration order.
pub type ValidatedFields = Vec<(String, Value)>;

/// Checks `input` against `schema` and projects it onto the declared properties.
///
/// Properties are checked in declaration order and the first violation is
/// returned. Input keys the schema does not declare are dropped; optional
/// properties that are absent are omitted.
///
/// # Errors
///
/// - [`ValidationError::NotAnObject`] if `input` is not an object
/// - [`ValidationError::MissingProperty`] if a required property is absent
/// - [`ValidationError::TypeMismatch`] if a present property has another kind
pub fn validate(input: &Value, schema: &Schema) -> Result<ValidatedFields, ValidationError> {
    let object = input.as_object().ok_or(ValidationError::NotAnObject)?;
    let mut fields = Vec::with_capacity(schema.properties().len());

    for prop in schema.properties() {
        match object.get(&prop.name) {
            None if prop.required => {
                return Err(ValidationError::MissingProperty(prop.name.clone()));
            }
            None => {}
            Some(value) if value.kind() != prop.kind => {
                return Err(ValidationError::TypeMismatch(prop.name.clone()));
            }
            Some(value) => fields.push((prop.name.clone(), value.clone())),
        }
    }

    Ok(fields)
}
