//! module tree and module configuration
//!
//! A [ModuleTree] owns its children. Each node is addressed by its path, which
//! always starts with the root marker [ROOT] (`["root", "network", "subnet"]`).
use crate::normalize;
use crate::value::Value;
use indexmap::IndexMap;

/// First element of every module path
pub const ROOT: &str = "root";

/// Key under which a module's variables are published (`root.network.subnet`)
pub fn module_path_key(path: &[String]) -> String {
    if path.is_empty() {
        return ROOT.to_string();
    }
    path.join(".")
}

#[derive(Debug, Clone)]
pub struct ModuleTree {
    path: Vec<String>,
    config: ModuleConfig,
    children: IndexMap<String, ModuleTree>,
}

impl ModuleTree {
    /// A root module without children
    pub fn root(config: ModuleConfig) -> Self {
        Self {
            path: vec![ROOT.to_string()],
            config,
            children: Default::default(),
        }
    }

    /// Attach a child module, replacing an existing child with the same name
    pub fn with_child(mut self, name: impl Into<String>, config: ModuleConfig) -> Self {
        self.add_child(name, config);
        self
    }

    /// Attach a child module and return it for further nesting
    pub fn add_child(
        &mut self,
        name: impl Into<String>,
        config: ModuleConfig,
    ) -> &mut ModuleTree {
        let name = name.into();
        let mut path = self.path.clone();
        path.push(name.clone());

        let child = ModuleTree {
            path,
            config,
            children: Default::default(),
        };
        self.children.insert(name.clone(), child);
        &mut self.children[&name]
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or(ROOT)
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn children(&self) -> &IndexMap<String, ModuleTree> {
        &self.children
    }

    /// Walk down to the module at `path`
    ///
    /// The first element is the root marker and is skipped.
    pub fn descendant(&self, path: &[String]) -> Result<&ModuleTree, PathNotFound> {
        let mut current = self;
        for name in path.iter().skip(1) {
            current = current.children.get(name).ok_or_else(|| PathNotFound {
                path: path.to_vec(),
                missing: name.clone(),
            })?;
        }
        Ok(current)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("module {} does not exist (no child {missing:?})", module_path_key(.path))]
pub struct PathNotFound {
    pub path: Vec<String>,
    pub missing: String,
}

/// Declarations of a single module
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    pub variables: Vec<Variable>,
    pub modules: Vec<ModuleCall>,
}

impl ModuleConfig {
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn module_call(&self, name: &str) -> Option<&ModuleCall> {
        self.modules.iter().find(|m| m.name == name)
    }
}

#[derive(derive_new::new, Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Type as written in the declaration, if any
    #[new(default)]
    pub declared_type: Option<String>,
    #[new(default)]
    pub default: Option<hcl::Value>,
}

impl Variable {
    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<hcl::Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Explicit type, or the type inferred from the default value
    pub fn var_type(&self) -> VariableType {
        if let Some(declared) = &self.declared_type {
            return declared.parse().unwrap_or(VariableType::Unknown);
        }

        let Some(default) = &self.default else {
            return VariableType::String;
        };

        match normalize::decode(default) {
            Some(Value::String(_)) => VariableType::String,
            Some(Value::List(_)) => VariableType::List,
            Some(Value::Map(_)) => VariableType::Map,
            Some(Value::Pending) | None => VariableType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    String,
    List,
    Map,
    /// Anything the type system does not support
    Unknown,
}

impl VariableType {
    pub fn printable(self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::List => "list",
            VariableType::Map => "map",
            VariableType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.printable())
    }
}

impl std::str::FromStr for VariableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(VariableType::String),
            "list" => Ok(VariableType::List),
            "map" => Ok(VariableType::Map),
            other => Err(format!("unsupported variable type {other:?}")),
        }
    }
}

/// A module block inside its parent: which module to use and what to pass in
#[derive(derive_new::new, Debug, Clone)]
pub struct ModuleCall {
    pub name: String,
    pub source: String,
    pub config: ResourceConfig,
}

/// Raw attributes of a configuration block
#[derive(derive_new::new, Debug, Clone, Default, PartialEq)]
pub struct ResourceConfig {
    pub raw: IndexMap<String, hcl::Value>,
    /// Dotted paths (`tags.owner`, `subnets.0`) whose value is derived from
    /// something not known yet
    #[new(default)]
    pub computed_keys: Vec<String>,
}

impl ResourceConfig {
    pub fn with_computed_key(mut self, path: impl Into<String>) -> Self {
        self.computed_keys.push(path.into());
        self
    }
}
