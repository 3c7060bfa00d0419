//! load module trees from directories of hcl files
//!
//! Every `*.hcl` file of a directory belongs to the same module. Recognized blocks:
//!
//! ```hcl
//! variable "region" {
//!   type    = string        # or "string", list, map
//!   default = "us-east-1"   # literal values only
//! }
//!
//! module "network" {
//!   source = "./network"    # relative to the declaring module
//!   cidr   = "10.0.0.0/16"  # everything else is an input
//!   vpc_id = aws_vpc.main.id
//! }
//! ```
//!
//! Any other block kind is skipped. Inputs that reference something (`aws_vpc.main.id`,
//! `"${var.name}"`, function calls) cannot be known here: they are left out of the raw
//! values and recorded as computed keys instead.
use crate::module_tree::{ModuleCall, ModuleConfig, ModuleTree, ResourceConfig, Variable};
use crate::visit::ReferenceCollector;
use hcl::eval::{Context, ErrorKind, Evaluate};
use hcl::{Expression, ObjectKey, Structure};
use std::path::{Path, PathBuf};

/// Load the module in `dir` and all modules it calls
pub fn load_module(dir: &Path) -> Result<ModuleTree, LoadError> {
    let dir = dir.canonicalize()?;
    let mut tree = ModuleTree::root(read_module_dir(&dir)?);

    let mut stack = vec![dir.clone()];
    attach_children(&mut tree, &dir, &mut stack)?;
    Ok(tree)
}

/// Configuration of a single module given as hcl text
pub fn parse_config(text: &str) -> Result<ModuleConfig, LoadError> {
    let mut builder = ConfigBuilder::default();
    builder.add_document(text, None)?;
    Ok(builder.config)
}

fn attach_children(
    tree: &mut ModuleTree,
    dir: &Path,
    stack: &mut Vec<PathBuf>,
) -> Result<(), LoadError> {
    let calls: Vec<(String, String)> = tree
        .config()
        .modules
        .iter()
        .map(|call| (call.name.clone(), call.source.clone()))
        .collect();

    for (name, source) in calls {
        let child_dir = dir.join(&source).canonicalize()?;
        if stack.contains(&child_dir) {
            return Err(LoadError::SourceCycle {
                module: name,
                dir: child_dir,
            });
        }

        tracing::debug!(module = %name, dir = %child_dir.display(), "loading child module");
        let child = tree.add_child(name, read_module_dir(&child_dir)?);

        stack.push(child_dir.clone());
        attach_children(child, &child_dir, stack)?;
        stack.pop();
    }

    Ok(())
}

fn read_module_dir(dir: &Path) -> Result<ModuleConfig, LoadError> {
    let mut files = vec![];
    for dir_entry in std::fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        if !dir_entry.file_type()?.is_file() {
            continue;
        }

        let is_hcl_file = dir_entry.file_name().to_string_lossy().ends_with(".hcl");
        if is_hcl_file {
            files.push(dir_entry.path());
        }
    }

    if files.is_empty() {
        return Err(LoadError::NoFilesFound {
            dir: dir.to_path_buf(),
        });
    }
    files.sort();

    let mut builder = ConfigBuilder::default();
    for file_path in files {
        tracing::info!(path = %file_path.display(), "loading file");
        let contents = std::fs::read_to_string(&file_path)?;
        builder.add_document(&contents, Some(&file_path))?;
    }

    Ok(builder.config)
}

#[derive(Default)]
struct ConfigBuilder {
    config: ModuleConfig,
}

impl ConfigBuilder {
    fn add_document(&mut self, text: &str, source: Option<&Path>) -> Result<(), LoadError> {
        let body = hcl_edit::parser::parse_body(text).map_err(|source_err| LoadError::Parse {
            path: source.map(Path::to_path_buf),
            source: source_err,
        })?;
        let body: hcl::Body = body.into();

        for structure in body.into_iter() {
            let block = match structure {
                Structure::Block(block) => block,
                Structure::Attribute(attribute) => {
                    return Err(LoadError::RootAttribute {
                        key: attribute.key.to_string(),
                        path: source.map(Path::to_path_buf),
                    })
                }
            };

            let kind = block.identifier.as_str();
            if kind != "variable" && kind != "module" {
                tracing::debug!(%kind, "skipping block");
                continue;
            }

            let [label] = block.labels.as_slice() else {
                return Err(LoadError::InvalidLabels {
                    kind: kind.to_string(),
                    path: source.map(Path::to_path_buf),
                });
            };
            let name = label.as_str().to_string();

            if kind == "variable" {
                if self.config.variable(&name).is_some() {
                    return Err(LoadError::DuplicateVariable { name });
                }
                let variable = parse_variable(name, &block.body)?;
                self.config.variables.push(variable);
            } else {
                if self.config.module_call(&name).is_some() {
                    return Err(LoadError::DuplicateModule { name });
                }
                let call = parse_module_call(name, &block.body)?;
                self.config.modules.push(call);
            }
        }

        Ok(())
    }
}

fn parse_variable(name: String, body: &hcl::Body) -> Result<Variable, LoadError> {
    let mut variable = Variable::new(name);

    for attribute in body.attributes() {
        match attribute.key.as_str() {
            "type" => {
                let declared_type = match &attribute.expr {
                    Expression::Variable(var) => var.as_str().to_string(),
                    Expression::String(s) => s.clone(),
                    _ => {
                        return Err(LoadError::InvalidType {
                            variable: variable.name,
                        })
                    }
                };
                variable.declared_type = Some(declared_type);
            }
            "default" => {
                if !ReferenceCollector::collect(&attribute.expr).is_empty() {
                    return Err(LoadError::NonLiteralDefault {
                        variable: variable.name,
                    });
                }
                let path = format!("var.{}.default", variable.name);
                variable.default = Some(evaluate_literal(&attribute.expr, path)?);
            }
            other => {
                tracing::trace!(variable = %variable.name, attribute = %other, "ignoring attribute")
            }
        }
    }

    Ok(variable)
}

fn parse_module_call(name: String, body: &hcl::Body) -> Result<ModuleCall, LoadError> {
    let mut source = None;
    let mut config = ResourceConfig::default();

    for attribute in body.attributes() {
        let key = attribute.key.to_string();
        if key == "source" {
            let Expression::String(s) = &attribute.expr else {
                return Err(LoadError::InvalidSource { module: name });
            };
            source = Some(s.clone());
            continue;
        }

        let value = split_computed(key.clone(), &attribute.expr, &mut config.computed_keys)?;
        if let Some(value) = value {
            config.raw.insert(key, value);
        }
    }

    let Some(source) = source else {
        return Err(LoadError::MissingSource { module: name });
    };

    Ok(ModuleCall::new(name, source, config))
}

/// Literal part of `expr`; computed parts are recorded in `computed` by their path
fn split_computed(
    path: String,
    expr: &Expression,
    computed: &mut Vec<String>,
) -> Result<Option<hcl::Value>, LoadError> {
    if let Expression::Object(object) = expr {
        let mut map: hcl::value::Map<String, hcl::Value> = Default::default();
        for (key, value) in object {
            let key = object_key(key, &path)?;
            // computed keys are split on dots
            if key.contains('.') {
                return Err(LoadError::InvalidObjectKey { path });
            }
            if let Some(value) = split_computed(format!("{path}.{key}"), value, computed)? {
                map.insert(key, value);
            }
        }
        return Ok(Some(hcl::Value::Object(map)));
    }

    let references = ReferenceCollector::collect(expr);
    if !references.is_empty() {
        tracing::debug!(%path, ?references, "computed key");
        computed.push(path);
        return Ok(None);
    }

    match expr.evaluate(&Context::new()) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            if !matches!(err.kind(), ErrorKind::UndefinedFunc(_)) {
                return Err(LoadError::Evaluation { path, source: err });
            }

            tracing::debug!(%path, "computed key (function call)");
            computed.push(path);
            Ok(None)
        }
    }
}

fn evaluate_literal(expr: &Expression, path: String) -> Result<hcl::Value, LoadError> {
    expr.evaluate(&Context::new()).map_err(|source| LoadError::Evaluation { path, source })
}

fn object_key(key: &ObjectKey, path: &str) -> Result<String, LoadError> {
    if let ObjectKey::Identifier(ident) = key {
        return Ok(ident.to_string());
    }

    let invalid = || LoadError::InvalidObjectKey {
        path: path.to_string(),
    };
    let ObjectKey::Expression(expr) = key else {
        return Err(invalid());
    };

    match expr.evaluate(&Context::new()) {
        Ok(hcl::Value::String(s)) => Ok(s),
        _ => Err(invalid()),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No files found in directory {}", .dir.display())]
    NoFilesFound { dir: PathBuf },
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse hcl file {}", display_source(.path))]
    Parse {
        path: Option<PathBuf>,
        source: hcl_edit::parser::Error,
    },
    #[error("Attribute {key} is not allowed outside of a block in {}", display_source(.path))]
    RootAttribute { key: String, path: Option<PathBuf> },
    #[error("A {kind} block needs exactly one label in {}", display_source(.path))]
    InvalidLabels { kind: String, path: Option<PathBuf> },
    #[error("Variable {name} is declared more than once")]
    DuplicateVariable { name: String },
    #[error("Module {name} is declared more than once")]
    DuplicateModule { name: String },
    #[error("Module {module} has no source")]
    MissingSource { module: String },
    #[error("Source of module {module} must be a literal string")]
    InvalidSource { module: String },
    #[error("Module {module} includes itself (via {})", .dir.display())]
    SourceCycle { module: String, dir: PathBuf },
    #[error("Type of variable {variable} must be string, list or map")]
    InvalidType { variable: String },
    #[error("Default of variable {variable} must be a literal value")]
    NonLiteralDefault { variable: String },
    #[error("Invalid object key in {path}")]
    InvalidObjectKey { path: String },
    #[error("Unable to evaluate {path}")]
    Evaluation {
        path: String,
        source: hcl::eval::Error,
    },
}

fn display_source(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<input>".to_string(),
    }
}
