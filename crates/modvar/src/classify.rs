//! display names for value shapes
//!
//! Used for diagnostics only. Comparing shapes is done with [Kind], never with the
//! rendered names.
use crate::value::Value;

/// Shape of a raw or canonical value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Boolean,
    Number,
    String,
    List,
    Map,
    Null,
    Pending,
}

impl Kind {
    /// Name of the shape as it would be written in a config file
    ///
    /// `null` and `pending` have no config-file counterpart and name the
    /// representation instead.
    pub fn type_name(self) -> &'static str {
        match self {
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Null => "null",
            Kind::Pending => "pending",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Anything that can be offered as a variable value
pub trait Classify {
    fn kind(&self) -> Kind;

    fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }
}

impl Classify for hcl::Value {
    fn kind(&self) -> Kind {
        match self {
            hcl::Value::Bool(_) => Kind::Boolean,
            hcl::Value::Number(_) => Kind::Number,
            hcl::Value::String(_) => Kind::String,
            hcl::Value::Array(_) => Kind::List,
            hcl::Value::Object(_) => Kind::Map,
            hcl::Value::Null => Kind::Null,
        }
    }
}

impl Classify for Value {
    fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Pending => Kind::Pending,
        }
    }
}
