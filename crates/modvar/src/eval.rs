//! evaluation nodes
//!
//! Each node is one step of evaluating a module's variables. A graph walker decides
//! when and in which order nodes run; [evaluate_tree] is a plain sequential walker
//! for whole trees.
use crate::check::{self, TypeMismatch};
use crate::classify::Classify;
use crate::context::EvalContext;
use crate::module_tree::{module_path_key, ModuleTree, PathNotFound, ResourceConfig};
use crate::normalize::{self, ValueShapeError};
use crate::patch::{self, PathError};
use crate::value::VariableValues;
use indexmap::IndexMap;

pub trait EvalNode {
    fn eval(&mut self, ctx: &EvalContext) -> Result<(), EvalError>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),
    #[error(transparent)]
    ValueShape(#[from] ValueShapeError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    ModuleNotFound(#[from] PathNotFound),
}

/// Check proposed values against the variables declared by the module at `module_path`
#[derive(derive_new::new, Debug)]
pub struct TypeCheckVariables<'a, V> {
    variables: &'a IndexMap<String, V>,
    module_path: &'a [String],
    module_tree: &'a ModuleTree,
}

impl<V: Classify> EvalNode for TypeCheckVariables<'_, V> {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(module = %module_path_key(self.module_path))
    )]
    fn eval(&mut self, _ctx: &EvalContext) -> Result<(), EvalError> {
        let target = self.module_tree.descendant(self.module_path)?;
        check::check_types(target.config(), self.module_path, self.variables)?;
        Ok(())
    }
}

/// Turn a configuration block into variable values, marking computed keys as pending
#[derive(derive_new::new, Debug)]
pub struct VariableBlock<'a> {
    config: &'a ResourceConfig,
    values: &'a mut VariableValues,
}

impl EvalNode for VariableBlock<'_> {
    #[tracing::instrument(level = "debug", skip_all)]
    fn eval(&mut self, _ctx: &EvalContext) -> Result<(), EvalError> {
        normalize::normalize(&self.config.raw, self.values)?;

        for path in &self.config.computed_keys {
            tracing::debug!(%path, "setting pending value for computed key");
            patch::set_pending_at_path(self.values, path)?;
        }

        Ok(())
    }
}

/// Publish the final variable values of a module
#[derive(derive_new::new, Debug)]
pub struct SetVariables {
    module: String,
    variables: VariableValues,
}

impl EvalNode for SetVariables {
    fn eval(&mut self, ctx: &EvalContext) -> Result<(), EvalError> {
        ctx.set_variables(self.module.clone(), std::mem::take(&mut self.variables));
        Ok(())
    }
}

/// Evaluate the variables of every module in `tree`, parents before children
///
/// The root module receives `root_inputs`. Every other module receives the inputs
/// of the module block that calls it.
pub fn evaluate_tree(
    tree: &ModuleTree,
    root_inputs: &IndexMap<String, hcl::Value>,
    ctx: &EvalContext,
) -> Result<(), EvalError> {
    let root_path = tree.path().to_vec();

    TypeCheckVariables::new(root_inputs, &root_path, tree).eval(ctx)?;

    let mut values = VariableValues::new();
    let root_config = ResourceConfig::new(root_inputs.clone());
    VariableBlock::new(&root_config, &mut values).eval(ctx)?;
    SetVariables::new(module_path_key(&root_path), values).eval(ctx)?;

    evaluate_children(tree, tree, ctx)
}

fn evaluate_children(
    root: &ModuleTree,
    parent: &ModuleTree,
    ctx: &EvalContext,
) -> Result<(), EvalError> {
    for (name, child) in parent.children() {
        let inputs = parent
            .config()
            .module_call(name)
            .map(|call| call.config.clone())
            .unwrap_or_default();

        let mut values = VariableValues::new();
        VariableBlock::new(&inputs, &mut values).eval(ctx)?;
        TypeCheckVariables::new(&values, child.path(), root).eval(ctx)?;
        SetVariables::new(module_path_key(child.path()), values).eval(ctx)?;

        evaluate_children(root, child, ctx)?;
    }

    Ok(())
}
