//! validate proposed variable values against declared variable types
use crate::classify::{Classify, Kind};
use crate::module_tree::{ModuleConfig, VariableType};
use indexmap::IndexMap;

/// Check every proposed value that belongs to a declared variable of `config`
///
/// Variables without a proposed value keep their default. Pending values cannot be
/// checked yet and are accepted. Proposed values for undeclared names are ignored.
pub fn check_types<V: Classify>(
    config: &ModuleConfig,
    module_path: &[String],
    proposed: &IndexMap<String, V>,
) -> Result<(), TypeMismatch> {
    for variable in &config.variables {
        let Some(proposed_value) = proposed.get(&variable.name) else {
            continue;
        };

        let kind = proposed_value.kind();
        if kind == Kind::Pending {
            tracing::trace!(variable = %variable.name, "skipping pending value");
            continue;
        }

        let declared_type = variable.var_type();
        let matches = match declared_type {
            VariableType::String => kind == Kind::String,
            VariableType::Map => kind == Kind::Map,
            VariableType::List => kind == Kind::List,
            VariableType::Unknown => false,
        };

        if !matches {
            return Err(TypeMismatch {
                name: variable.name.clone(),
                module_path: module_path.to_vec(),
                expected: declared_type,
                observed: kind,
            });
        }
    }

    Ok(())
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("variable {name}{} should be type {expected}, got {observed}", in_module(.module_path))]
pub struct TypeMismatch {
    pub name: String,
    pub module_path: Vec<String>,
    pub expected: VariableType,
    pub observed: Kind,
}

/// ` in module a.b`, or nothing for the root module
fn in_module(module_path: &[String]) -> String {
    if module_path.len() <= 1 {
        return String::new();
    }
    format!(" in module {}", module_path[1..].join("."))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::module_tree::Variable;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn config(variables: Vec<Variable>) -> ModuleConfig {
        ModuleConfig {
            variables,
            ..Default::default()
        }
    }

    fn var(name: &str, declared_type: &str) -> Variable {
        Variable::new(name.into()).with_type(declared_type)
    }

    fn proposed<V>(entries: Vec<(&str, V)>) -> IndexMap<String, V> {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn root() -> Vec<String> {
        vec!["root".into()]
    }

    #[test]
    fn matching_shapes() {
        let config = config(vec![var("s", "string"), var("l", "list"), var("m", "map")]);
        let values = proposed(vec![
            ("s", hcl::Value::from("x")),
            ("l", hcl::Value::Array(vec![])),
            ("m", hcl::Value::Object(Default::default())),
        ]);
        assert_eq!(check_types(&config, &root(), &values), Ok(()));
    }

    #[test]
    fn pending_is_always_accepted() {
        for declared in ["string", "list", "map", "number"] {
            let config = config(vec![var("v", declared)]);
            let values = proposed(vec![("v", Value::Pending)]);
            assert_eq!(check_types(&config, &root(), &values), Ok(()), "{declared}");
        }
    }

    #[test]
    fn absent_is_always_accepted() {
        let config = config(vec![var("v", "map"), var("w", "unsupported")]);
        let values = proposed::<hcl::Value>(vec![("other", true.into())]);
        assert_eq!(check_types(&config, &root(), &values), Ok(()));
    }

    #[test]
    fn number_for_string_at_root() {
        let config = config(vec![var("size", "string")]);
        let values = proposed(vec![("size", hcl::Value::from(3))]);

        let err = check_types(&config, &root(), &values).unwrap_err();
        assert_eq!(err.to_string(), "variable size should be type string, got number");
    }

    #[test]
    fn number_for_string_in_module() {
        let config = config(vec![var("size", "string")]);
        let values = proposed(vec![("size", hcl::Value::from(3))]);
        let path = vec!["root".to_string(), "db".to_string()];

        let err = check_types(&config, &path, &values).unwrap_err();
        assert_eq!(
            err.to_string(),
            "variable size in module db should be type string, got number"
        );
    }

    #[test]
    fn nested_module_path_is_dotted() {
        let config = config(vec![var("zones", "list")]);
        let values = proposed(vec![("zones", Value::from("a"))]);
        let path: Vec<String> = ["root", "network", "subnet"].map(String::from).to_vec();

        let err = check_types(&config, &path, &values).unwrap_err();
        assert_eq!(
            err.to_string(),
            "variable zones in module network.subnet should be type list, got string"
        );
    }

    #[test]
    fn inferred_type_from_default() {
        let config = config(vec![
            Variable::new("tags".into()).with_default(hcl::Value::Object(Default::default())),
        ]);
        let values = proposed(vec![("tags", Value::from(vec!["a"]))]);

        let err = check_types(&config, &root(), &values).unwrap_err();
        assert_eq!(err.expected, VariableType::Map);
        assert_eq!(err.observed, Kind::List);
    }

    #[test]
    fn unsupported_declared_type() {
        let config = config(vec![var("count", "number")]);
        let values = proposed(vec![("count", hcl::Value::from("3"))]);

        let err = check_types(&config, &root(), &values).unwrap_err();
        assert_eq!(err.to_string(), "variable count should be type unknown, got string");
    }

    #[test]
    fn boolean_for_map() {
        let config = config(vec![var("tags", "map")]);
        let values = proposed(vec![("tags", hcl::Value::Bool(false))]);

        let err = check_types(&config, &root(), &values).unwrap_err();
        assert_eq!(err.to_string(), "variable tags should be type map, got boolean");
    }
}
