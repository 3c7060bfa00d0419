//! root module inputs from the command line, var files and the environment
//!
//! Values are written as hcl expressions (`zones=["a", "b"]`). Plain numbers stay
//! text (`size=3` is the string `"3"`) so the variable's type decides. Text that does
//! not parse as an expression is taken as a plain string (`region=us-east-1`).
//!
//! Later sources win: environment, then var files, then assignments ([merge]).
use hcl::eval::{Context, Evaluate};
use indexmap::IndexMap;
use std::path::Path;

/// Default prefix of environment variables holding root inputs
pub const ENV_PREFIX: &str = "MODVAR_VAR_";

pub type Inputs = IndexMap<String, hcl::Value>;

/// Split `name=value`
pub fn parse_assignment(assignment: &str) -> Result<(String, hcl::Value), InputError> {
    let Some((name, value)) = assignment.split_once('=') else {
        return Err(InputError::MissingEquals(assignment.to_string()));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::MissingName(assignment.to_string()));
    }

    Ok((name.to_string(), parse_value(value)))
}

/// Evaluate `text` as a literal hcl expression, falling back to the text itself
pub fn parse_value(text: &str) -> hcl::Value {
    let trimmed = text.trim();
    if trimmed.parse::<i64>().is_ok() || trimmed.parse::<f64>().is_ok() {
        return hcl::Value::String(text.to_string());
    }

    let Ok(expr) = text.parse::<hcl_edit::expr::Expression>() else {
        return hcl::Value::String(text.to_string());
    };

    let expr: hcl::Expression = expr.into();
    match expr.evaluate(&Context::new()) {
        Ok(value) => value,
        Err(err) => {
            tracing::trace!(%text, %err, "not a literal, using text");
            hcl::Value::String(text.to_string())
        }
    }
}

/// Top-level attributes of an hcl file
pub fn load_var_file(path: &Path) -> Result<Inputs, InputError> {
    tracing::info!(path = %path.display(), "loading var file");
    let contents = std::fs::read_to_string(path)?;
    let body: hcl::Body = hcl_edit::parser::parse_body(&contents)?.into();

    let mut inputs = Inputs::new();
    for attribute in body.attributes() {
        let value = attribute
            .expr
            .evaluate(&Context::new())
            .map_err(|source| InputError::Evaluation {
                name: attribute.key.to_string(),
                source,
            })?;
        inputs.insert(attribute.key.to_string(), value);
    }

    Ok(inputs)
}

/// Inputs from `<prefix><name>=<value>` pairs, usually [std::env::vars]
pub fn from_env(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Inputs {
    vars.into_iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(prefix)?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), parse_value(&value)))
        })
        .collect()
}

/// Combine root inputs, later sources overriding earlier ones
pub fn merge(
    env: Inputs,
    var_files: impl IntoIterator<Item = Inputs>,
    assignments: impl IntoIterator<Item = (String, hcl::Value)>,
) -> Inputs {
    let mut merged = env;
    for file_inputs in var_files {
        merged.extend(file_inputs);
    }
    merged.extend(assignments);
    merged
}

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("expected name=value, got {0:?}")]
    MissingEquals(String),
    #[error("variable name missing in {0:?}")]
    MissingName(String),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse var file")]
    HclParseFailed(#[from] hcl_edit::parser::Error),
    #[error("Unable to evaluate {name}")]
    Evaluation {
        name: String,
        source: hcl::eval::Error,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn assignments() {
        assert_eq!(
            parse_assignment("size=3").unwrap(),
            ("size".to_string(), hcl::Value::from("3"))
        );
        assert_eq!(
            parse_assignment("ratio=1.5").unwrap(),
            ("ratio".to_string(), hcl::Value::from("1.5"))
        );
        assert_eq!(
            parse_assignment("region=us-east-1").unwrap(),
            ("region".to_string(), hcl::Value::from("us-east-1"))
        );
        assert_eq!(
            parse_assignment(r#"zones=["a", "b"]"#).unwrap(),
            (
                "zones".to_string(),
                hcl::Value::Array(vec!["a".into(), "b".into()])
            )
        );
        assert_eq!(
            parse_assignment("empty=").unwrap(),
            ("empty".to_string(), hcl::Value::from(""))
        );
    }

    #[test]
    fn invalid_assignments() {
        assert!(matches!(
            parse_assignment("size"),
            Err(InputError::MissingEquals(_))
        ));
        assert!(matches!(
            parse_assignment("=3"),
            Err(InputError::MissingName(_))
        ));
    }

    #[test]
    fn environment() {
        let vars = [
            ("MODVAR_VAR_region".to_string(), "eu-west-1".to_string()),
            ("MODVAR_VAR_".to_string(), "ignored".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let inputs = from_env(ENV_PREFIX, vars);

        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs["region"], hcl::Value::from("eu-west-1"));
    }

    #[test]
    fn numeric_assignment_fits_string_variable() {
        use crate::context::EvalContext;
        use crate::eval::evaluate_tree;
        use crate::loader::parse_config;
        use crate::module_tree::ModuleTree;

        let config = parse_config(r#"variable "instance_count" {}"#).unwrap();
        let (name, value) = parse_assignment("instance_count=3").unwrap();
        let root_inputs = Inputs::from([(name, value)]);

        let ctx = EvalContext::new();
        evaluate_tree(&ModuleTree::root(config), &root_inputs, &ctx).unwrap();
        assert_eq!(
            ctx.variables("root").unwrap()["instance_count"],
            crate::value::Value::from("3")
        );
    }

    #[test]
    fn later_sources_win() {
        let env = Inputs::from([
            ("region".to_string(), hcl::Value::from("env")),
            ("size".to_string(), hcl::Value::from("env")),
            ("zone".to_string(), hcl::Value::from("env")),
        ]);
        let files = vec![
            Inputs::from([
                ("size".to_string(), hcl::Value::from("file-1")),
                ("zone".to_string(), hcl::Value::from("file-1")),
            ]),
            Inputs::from([("zone".to_string(), hcl::Value::from("file-2"))]),
        ];
        let assignments = vec![
            parse_assignment("size=var-1").unwrap(),
            parse_assignment("size=var-2").unwrap(),
        ];

        let merged = merge(env, files, assignments);

        assert_eq!(merged["region"], hcl::Value::from("env"));
        assert_eq!(merged["size"], hcl::Value::from("var-2"));
        assert_eq!(merged["zone"], hcl::Value::from("file-2"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn var_file() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("var_files")
            .join("prod.hcl");
        let inputs = load_var_file(&path).unwrap();

        let names: Vec<&str> = inputs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["region", "zones", "tags"]);
        assert_eq!(inputs["region"], hcl::Value::from("eu-west-1"));
        assert_eq!(
            inputs["zones"],
            hcl::Value::Array(vec!["a".into(), "b".into()])
        );
        let tags: hcl::value::Map<String, hcl::Value> =
            [("owner".to_string(), hcl::Value::from("ops"))]
                .into_iter()
                .collect();
        assert_eq!(inputs["tags"], hcl::Value::Object(tags));
    }

    #[test]
    fn var_file_must_be_literal() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("var_files")
            .join("reference.hcl");
        let err = load_var_file(&path).unwrap_err();
        assert!(matches!(err, InputError::Evaluation { ref name, .. } if name == "region"));
    }
}
