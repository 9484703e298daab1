//! Reading variables out of, and writing them into, policy documents

use serde_json::Value;
use tracing::debug;

use crate::context::VariableContext;
use crate::definition::VariableDefinition;
use crate::error::PathError;
use crate::path::Path;
use crate::value::TypedValue;

/// Resolves every definition against the document into a fresh context
///
/// A path that is malformed, missing from the document, or leads to a value
/// that cannot be read as the declared type leaves the variable unset.
/// Definitions without a path keep their declared value.
pub fn resolve(document: &Value, definitions: &[VariableDefinition]) -> VariableContext {
    let mut ctx = VariableContext::new();
    resolve_into(&mut ctx, document, definitions, None);
    ctx
}

/// Resolves definitions into an existing context
///
/// When `prefix` is given, each definition's path is read relative to it;
/// this is how cover-scoped variables share codes across covers.
pub fn resolve_into(
    ctx: &mut VariableContext,
    document: &Value,
    definitions: &[VariableDefinition],
    prefix: Option<&Path>,
) {
    for definition in definitions {
        ctx.insert_definition(definition.clone());
        if !definition.has_path() {
            continue;
        }

        let path = match Path::parse(&definition.path) {
            Ok(path) => path,
            Err(e) => {
                debug!(code = definition.code(), error = %e, "Unparsable variable path");
                ctx.unset(definition.code());
                continue;
            }
        };
        let path = match prefix {
            Some(prefix) => prefix.join(&path),
            None => path,
        };

        match path
            .read(document)
            .and_then(|node| TypedValue::from_json(definition.data_type, node))
        {
            Some(value) => {
                // Type already matches the definition just inserted
                let _ = ctx.set(definition.code(), value);
            }
            None => ctx.unset(definition.code()),
        }
    }
}

/// Reads the raw text at `path`, if the path resolves to a scalar
pub fn read_raw(document: &Value, path: &str) -> Option<String> {
    let path = Path::parse(path).ok()?;
    match path.read(document)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Writes a typed value at `path`, creating intermediate structure
///
/// Fails only when the path itself is malformed.
pub fn write(document: &mut Value, path: &str, value: &TypedValue) -> Result<(), PathError> {
    let path = Path::parse(path)?;
    path.write(document, value.to_json());
    Ok(())
}

/// Writes a typed value at a pre-parsed path
pub fn write_at(document: &mut Value, path: &Path, value: &TypedValue) {
    path.write(document, value.to_json());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::DataType;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "policyHolder": { "person": { "birthDate": "1985-04-12", "gender": "M" } },
            "startDate": "2024-03-01",
            "insuredObjects": [
                { "covers": [ { "code": "FIRE", "sumInsured": "150000" } ] }
            ]
        })
    }

    #[test]
    fn test_resolve_types_values() {
        let ctx = resolve(
            &document(),
            &[
                VariableDefinition::new("birthDate", "", "policyHolder.person.birthDate", DataType::Date),
                VariableDefinition::new(
                    "fireSum",
                    "",
                    "insuredObjects[0].covers[?(@.code == 'FIRE')].sumInsured",
                    DataType::Number,
                ),
            ],
        );
        assert_eq!(ctx.raw("birthDate"), "1985-04-12");
        assert_eq!(ctx.number("fireSum"), Some(dec!(150000)));
    }

    #[test]
    fn test_missing_and_malformed_paths_are_unset() {
        let ctx = resolve(
            &document(),
            &[
                VariableDefinition::new("missing", "", "policyHolder.organization.inn", DataType::String),
                VariableDefinition::new("broken", "", "policyHolder..person", DataType::String),
                VariableDefinition::new("wrongType", "", "policyHolder.person.gender", DataType::Number),
            ],
        );
        assert_eq!(ctx.len(), 3);
        assert!(!ctx.is_set("missing"));
        assert!(!ctx.is_set("broken"));
        assert!(!ctx.is_set("wrongType"));
    }

    #[test]
    fn test_resolve_with_prefix() {
        let prefix = Path::parse("insuredObjects[0].covers[?(@.code == 'FIRE')]").unwrap();
        let mut ctx = VariableContext::new();
        resolve_into(
            &mut ctx,
            &document(),
            &[VariableDefinition::new("sumInsured", "", "sumInsured", DataType::Number)],
            Some(&prefix),
        );
        assert_eq!(ctx.number("sumInsured"), Some(dec!(150000)));
    }

    #[test]
    fn test_write_then_read() {
        let mut doc = document();
        write(&mut doc, "insuredObjects[0].covers[0].premium", &TypedValue::Number(dec!(1234.56))).unwrap();
        assert_eq!(
            read_raw(&doc, "insuredObjects[0].covers[0].premium"),
            Some("1234.56".to_string())
        );
    }

    #[test]
    fn test_write_malformed_path_fails() {
        let mut doc = document();
        assert!(write(&mut doc, "a[", &TypedValue::Text("x".into())).is_err());
    }
}
