//! # modvar - module variable resolution
//!
//! Validates and normalizes the values handed to the variables of modules in an
//! hcl configuration tree, and publishes them for later interpolation.
//!
//! ## Introduction for developers
//!
//! ### Module trees
//!
//! A configuration is a tree of modules ([module_tree::ModuleTree]). Each module
//! declares variables and may call child modules:
//!
//! ```hcl
//! variable "region" {
//!   default = "us-east-1"
//! }
//!
//! module "db" {
//!   source = "./db"
//!   size   = 3
//!   tags   = { owner = "ops", host = aws_instance.web.private_ip }
//! }
//! ```
//!
//! Modules are addressed by path, always starting with `root`: `["root", "db"]`.
//! [loader::load_module] builds a tree from directories of `.hcl` files.
//!
//! ### Values
//!
//! Inputs arrive as raw [hcl::Value]s. Published values are canonical
//! [value::Value]s: string, list, map, or [value::Value::Pending] for anything that
//! is only known once some resource exists.
//!
//! Some inputs cannot be known while loading (`aws_instance.web.private_ip` above).
//! They are left out of the raw values and recorded as computed keys, dotted paths
//! such as `tags.host`.
//!
//! ### Evaluation
//!
//! For each module the following steps ([eval::EvalNode]s) run:
//!
//! | **step**                    | **does**                                                    |
//! |-----------------------------|-------------------------------------------------------------|
//! | [eval::VariableBlock]       | raw inputs → canonical values ([normalize])                 |
//! |                             | computed keys → [value::Value::Pending] ([patch])           |
//! | [eval::TypeCheckVariables]  | values vs. declared variable types ([check])                |
//! | [eval::SetVariables]        | publish into the shared [context::EvalContext]              |
//!
//! The root module receives raw inputs from the command line, var files and the
//! environment ([inputs]); those are type checked before they are normalized.
//!
//! Type errors read like this:
//!
//! ```text
//! variable size in module db should be type string, got number
//! ```
//!
pub mod check;
pub mod classify;
pub mod context;
pub mod eval;
pub mod inputs;
pub mod loader;
pub mod module_tree;
pub mod normalize;
pub mod patch;
pub mod value;
mod visit;
