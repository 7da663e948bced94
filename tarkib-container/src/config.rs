//! The configuration snapshot: preferences, virtual types, type configs.
//!
//! The container never reads files itself; an external collaborator
//! materializes a [`ContainerConfig`] (by hand, or through serde from
//! JSON or any other format) and hands it to the builder once. The
//! snapshot is validated by the type system at deserialization time and
//! is immutable after `build()`.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Opaque string identifier naming a class, interface or virtual type.
pub type TypeName = String;

/// Argument specs keyed by parameter name, iterated in a stable order.
pub type ArgumentSpecMap = BTreeMap<String, ArgumentSpec>;

/// Strips leading namespace separators (`\` and `::`) from a type name.
///
/// ```
/// use tarkib_container::config::normalize_type_name;
///
/// assert_eq!(normalize_type_name(r"\app\Logger"), r"app\Logger");
/// assert_eq!(normalize_type_name("::app::Logger"), "app::Logger");
/// assert_eq!(normalize_type_name("Logger"), "Logger");
/// ```
pub fn normalize_type_name(name: &str) -> &str {
    name.trim_start_matches(['\\', ':'])
}

/// A literal argument value.
///
/// The closed set of scalar kinds a configuration may carry. Values are
/// copied verbatim into argument sets; they are never checked against
/// the declared parameter upfront.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats here; the reverse never happens.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float(f) => Some(*f),
            ScalarValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int(v.into())
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Str(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Str(v)
    }
}

/// Declares how to supply one named constructor/method parameter.
///
/// Exactly two kinds exist: a literal scalar, or a reference to another
/// resolvable type. In serialized form the variant is selected by a
/// `kind` field:
///
/// ```json
/// { "kind": "scalar", "value": 60 }
/// { "kind": "object", "type": "DbConnection", "shared": true }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArgumentSpec {
    /// A literal value copied verbatim into the argument set.
    Scalar { value: ScalarValue },
    /// A reference to another type the container resolves on demand.
    Object {
        #[serde(rename = "type")]
        type_name: TypeName,
        #[serde(default)]
        shared: bool,
    },
}

impl ArgumentSpec {
    /// Shorthand for a scalar spec.
    pub fn scalar(value: impl Into<ScalarValue>) -> Self {
        ArgumentSpec::Scalar {
            value: value.into(),
        }
    }

    /// Shorthand for an object reference spec.
    pub fn object(type_name: impl Into<TypeName>, shared: bool) -> Self {
        ArgumentSpec::Object {
            type_name: type_name.into(),
            shared,
        }
    }
}

/// A named configuration that builds a different base type with preset
/// constructor arguments. Acts as a type alias with baked-in parameters
/// and is distinct from a real registered type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VirtualTypeConfig {
    #[serde(rename = "type")]
    pub base_type: TypeName,
    #[serde(default)]
    pub arguments: ArgumentSpecMap,
}

impl VirtualTypeConfig {
    pub fn new(base_type: impl Into<TypeName>) -> Self {
        Self {
            base_type: base_type.into(),
            arguments: ArgumentSpecMap::new(),
        }
    }

    pub fn argument(mut self, name: impl Into<String>, spec: ArgumentSpec) -> Self {
        self.arguments.insert(name.into(), spec);
        self
    }
}

/// The shared flag and argument specs associated with a concrete type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypeConfig {
    pub shared: bool,
    pub arguments: ArgumentSpecMap,
}

impl TypeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    pub fn argument(mut self, name: impl Into<String>, spec: ArgumentSpec) -> Self {
        self.arguments.insert(name.into(), spec);
        self
    }
}

/// The full configuration snapshot handed to the builder.
///
/// All three maps default to empty so partial snapshots deserialize.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Interface-to-concrete redirection, one hop, never chained.
    pub preferences: HashMap<TypeName, TypeName>,
    /// Named alias configurations building a base type with preset args.
    pub virtual_types: HashMap<TypeName, VirtualTypeConfig>,
    /// Per-type shared flag and argument specs.
    pub types: HashMap<TypeName, TypeConfig>,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot with every configured type name stripped of
    /// leading namespace separators: map keys, preference targets,
    /// virtual base types and object-argument references alike.
    pub fn normalized(self) -> Self {
        let preferences = self
            .preferences
            .into_iter()
            .map(|(k, v)| {
                (
                    normalize_type_name(&k).to_string(),
                    normalize_type_name(&v).to_string(),
                )
            })
            .collect();

        let virtual_types = self
            .virtual_types
            .into_iter()
            .map(|(k, mut vt)| {
                vt.base_type = normalize_type_name(&vt.base_type).to_string();
                vt.arguments = normalize_specs(vt.arguments);
                (normalize_type_name(&k).to_string(), vt)
            })
            .collect();

        let types = self
            .types
            .into_iter()
            .map(|(k, mut tc)| {
                tc.arguments = normalize_specs(tc.arguments);
                (normalize_type_name(&k).to_string(), tc)
            })
            .collect();

        Self {
            preferences,
            virtual_types,
            types,
        }
    }
}

fn normalize_specs(specs: ArgumentSpecMap) -> ArgumentSpecMap {
    specs
        .into_iter()
        .map(|(name, spec)| {
            let spec = match spec {
                ArgumentSpec::Object { type_name, shared } => ArgumentSpec::Object {
                    type_name: normalize_type_name(&type_name).to_string(),
                    shared,
                },
                scalar => scalar,
            };
            (name, spec)
        })
        .collect()
}
