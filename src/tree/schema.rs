//! Declarative field schemas for node kinds
//!
//! Every node kind declares, once, which named fields it carries: scalar
//! parameters with a type-converting default, bounded parameter lists,
//! singleton child objects and bounded child-object lists. The declaration is
//! resolved into one [`FieldDescriptor`] per field name so the node operations
//! dispatch by pattern matching.

use crate::error::{ModelError, Result};
use crate::tree::value::Value;
use std::collections::BTreeMap;

/// Type and range rules of a scalar parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// Takes any value unchanged.
    Any,
    Bool,
    Int { min: Option<i64>, max: Option<i64> },
    /// Accepts ints and widens them.
    Float { min: Option<f64>, max: Option<f64> },
    /// An int restricted to the listed choices, each with a label.
    Enum { choices: BTreeMap<i64, String> },
    Str { fixlen: Option<usize> },
}

/// Describes a scalar parameter or the elements of a parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    ty: ParamType,
    default: Value,
    description: String,
}

impl ParamInfo {
    fn with_type(ty: ParamType, default: Value) -> Self {
        Self {
            ty,
            default,
            description: String::new(),
        }
    }

    pub fn any(default: impl Into<Value>) -> Self {
        Self::with_type(ParamType::Any, default.into())
    }

    pub fn boolean(default: bool) -> Self {
        Self::with_type(ParamType::Bool, Value::Bool(default))
    }

    pub fn int(default: i64) -> Self {
        Self::int_range(default, None, None)
    }

    pub fn int_range(default: i64, min: Option<i64>, max: Option<i64>) -> Self {
        Self::with_type(ParamType::Int { min, max }, Value::Int(default))
    }

    pub fn float(default: f64) -> Self {
        Self::float_range(default, None, None)
    }

    pub fn float_range(default: f64, min: Option<f64>, max: Option<f64>) -> Self {
        Self::with_type(ParamType::Float { min, max }, Value::Float(default))
    }

    /// An enumerated int parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use rietveld_model::tree::ParamInfo;
    ///
    /// let info = ParamInfo::enumeration(0, &[(0, "hard boundary"), (1, "periodic boundary")]);
    /// assert_eq!(info.label(&1.into()), Some("periodic boundary"));
    /// assert!(info.convert("IBound", &2.into()).is_err());
    /// ```
    pub fn enumeration(default: i64, choices: &[(i64, &str)]) -> Self {
        let choices = choices
            .iter()
            .map(|(value, label)| (*value, label.to_string()))
            .collect();
        Self::with_type(ParamType::Enum { choices }, Value::Int(default))
    }

    pub fn string(default: &str) -> Self {
        Self::with_type(ParamType::Str { fixlen: None }, Value::from(default))
    }

    /// A string that must be exactly `len` bytes long.
    pub fn fixed_string(default: &str, len: usize) -> Self {
        Self::with_type(ParamType::Str { fixlen: Some(len) }, Value::from(default))
    }

    /// Attach a human-readable description.
    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn param_type(&self) -> &ParamType {
        &self.ty
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check the type and range of a value and convert it to the declared type.
    pub fn convert(&self, field: &str, value: &Value) -> Result<Value> {
        let fail = |message: String| ModelError::TypeConversion {
            field: field.to_string(),
            message,
        };

        match (&self.ty, value) {
            (ParamType::Any, v) => Ok(v.clone()),

            (ParamType::Bool, Value::Bool(b)) => Ok(Value::Bool(*b)),

            (ParamType::Int { min, max }, Value::Int(i)) => {
                if min.is_some_and(|m| *i < m) || max.is_some_and(|m| *i > m) {
                    return Err(fail(format!(
                        "value {} out of range ({:?}, {:?})",
                        i, min, max
                    )));
                }
                Ok(Value::Int(*i))
            }

            (ParamType::Float { min, max }, v @ (Value::Float(_) | Value::Int(_))) => {
                // the pattern guarantees a numeric value
                let x = v.as_f64().unwrap_or_default();
                if min.is_some_and(|m| x < m) || max.is_some_and(|m| x > m) {
                    return Err(fail(format!(
                        "value {} out of range ({:?}, {:?})",
                        x, min, max
                    )));
                }
                Ok(Value::Float(x))
            }

            (ParamType::Enum { choices }, Value::Int(i)) => {
                if choices.contains_key(i) {
                    Ok(Value::Int(*i))
                } else {
                    Err(fail(format!(
                        "can only take a value in {:?}, but {} is received",
                        choices.keys().collect::<Vec<_>>(),
                        i
                    )))
                }
            }

            (ParamType::Str { fixlen }, Value::Str(s)) => {
                if !s.is_ascii() {
                    return Err(fail(format!("'{}' is not an ascii string", s)));
                }
                if fixlen.is_some_and(|n| s.len() != n) {
                    return Err(fail(format!("'{}' does not match the length", s)));
                }
                Ok(Value::Str(s.clone()))
            }

            (ty, v) => Err(fail(format!(
                "expects {}, but a '{}'={} is received",
                type_label(ty),
                v.type_name(),
                v
            ))),
        }
    }

    /// Translate text into a value of the declared type.
    pub fn parse(&self, field: &str, text: &str) -> Result<Value> {
        let fail = |message: String| ModelError::TypeConversion {
            field: field.to_string(),
            message,
        };
        let trimmed = text.trim();

        let value = match &self.ty {
            ParamType::Any => {
                if let Ok(i) = trimmed.parse::<i64>() {
                    Value::Int(i)
                } else if let Ok(x) = trimmed.parse::<f64>() {
                    Value::Float(x)
                } else {
                    Value::from(text)
                }
            }
            ParamType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => return Err(fail(format!("'{}' is not a bool", text))),
            },
            ParamType::Int { .. } | ParamType::Enum { .. } => trimmed
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| fail(format!("'{}': {}", text, e)))?,
            ParamType::Float { .. } => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| fail(format!("'{}': {}", text, e)))?,
            ParamType::Str { .. } => Value::from(text),
        };

        self.convert(field, &value)
    }

    /// Label of an enumerated value.
    pub fn label(&self, value: &Value) -> Option<&str> {
        match (&self.ty, value) {
            (ParamType::Enum { choices }, Value::Int(i)) => choices.get(i).map(String::as_str),
            _ => None,
        }
    }
}

fn type_label(ty: &ParamType) -> &'static str {
    match ty {
        ParamType::Any => "any",
        ParamType::Bool => "a 'bool'",
        ParamType::Int { .. } => "an 'int'",
        ParamType::Float { .. } => "a 'float'",
        ParamType::Enum { .. } => "an enumerated 'int'",
        ParamType::Str { .. } => "a 'str'",
    }
}

/// Minimum and optional maximum size of a list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl SizeBounds {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    pub fn exactly(n: usize) -> Self {
        Self::new(n, Some(n))
    }

    pub fn at_least(min: usize) -> Self {
        Self::new(min, None)
    }

    pub fn unbounded() -> Self {
        Self::new(0, None)
    }

    pub fn is_consistent(&self) -> bool {
        self.max.map_or(true, |max| self.min <= max)
    }
}

/// Which node kinds a child field accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    accepts: Vec<String>,
}

impl ObjectInfo {
    pub fn of(kind: &str) -> Self {
        Self {
            accepts: vec![kind.to_string()],
        }
    }

    pub fn any_of(kinds: &[&str]) -> Self {
        Self {
            accepts: kinds.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn accepts(&self) -> &[String] {
        &self.accepts
    }

    /// Check a candidate child schema against the accepted kinds.
    pub fn check(&self, field: &str, schema: &NodeSchema) -> Result<()> {
        if self.accepts.iter().any(|kind| schema.is_a(kind)) {
            return Ok(());
        }
        Err(ModelError::TypeMismatch {
            field: field.to_string(),
            expected: self.accepts.join("|"),
            found: schema.kind().to_string(),
        })
    }
}

/// The resolved declaration of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDescriptor {
    Param(ParamInfo),
    ParamList(ParamInfo, SizeBounds),
    Object(ObjectInfo),
    ObjectList(ObjectInfo, SizeBounds),
}

/// The field declarations of a node kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSchema {
    kind: String,
    bases: Vec<String>,
    fields: BTreeMap<String, FieldDescriptor>,
    session_field: Option<String>,
}

impl NodeSchema {
    /// Start declaring a node kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use rietveld_model::tree::{NodeSchema, ObjectInfo, ParamInfo, SizeBounds};
    ///
    /// let phase = NodeSchema::builder("Phase")
    ///     .param("Name", ParamInfo::string(""))
    ///     .param_list("Cell", ParamInfo::float(1.0), SizeBounds::exactly(6))
    ///     .object_list("Atom", ObjectInfo::of("Atom"), SizeBounds::at_least(1))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(phase.kind(), "Phase");
    /// assert_eq!(phase.params().count(), 1);
    /// ```
    pub fn builder(kind: &str) -> NodeSchemaBuilder {
        NodeSchemaBuilder {
            schema: NodeSchema {
                kind: kind.to_string(),
                bases: Vec::new(),
                fields: BTreeMap::new(),
                session_field: None,
            },
            duplicates: Vec::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// True if the kind is `kind` or derives from it.
    pub fn is_a(&self, kind: &str) -> bool {
        self.kind == kind || self.bases.iter().any(|b| b == kind)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// All fields, sorted by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamInfo)> {
        self.fields.iter().filter_map(|(k, v)| match v {
            FieldDescriptor::Param(info) => Some((k.as_str(), info)),
            _ => None,
        })
    }

    pub fn param_lists(&self) -> impl Iterator<Item = (&str, &ParamInfo, SizeBounds)> {
        self.fields.iter().filter_map(|(k, v)| match v {
            FieldDescriptor::ParamList(info, bounds) => Some((k.as_str(), info, *bounds)),
            _ => None,
        })
    }

    pub fn objects(&self) -> impl Iterator<Item = (&str, &ObjectInfo)> {
        self.fields.iter().filter_map(|(k, v)| match v {
            FieldDescriptor::Object(info) => Some((k.as_str(), info)),
            _ => None,
        })
    }

    pub fn object_lists(&self) -> impl Iterator<Item = (&str, &ObjectInfo, SizeBounds)> {
        self.fields.iter().filter_map(|(k, v)| match v {
            FieldDescriptor::ObjectList(info, bounds) => Some((k.as_str(), info, *bounds)),
            _ => None,
        })
    }

    /// The singleton field holding this root's refine set, if the kind is a
    /// refinement-session root.
    pub fn session_field(&self) -> Option<&str> {
        self.session_field.as_deref()
    }
}

/// Builder returned by [`NodeSchema::builder`].
#[derive(Debug, Clone)]
pub struct NodeSchemaBuilder {
    schema: NodeSchema,
    duplicates: Vec<String>,
}

impl NodeSchemaBuilder {
    fn insert(mut self, name: &str, field: FieldDescriptor) -> Self {
        if self.schema.fields.insert(name.to_string(), field).is_some() {
            self.duplicates.push(name.to_string());
        }
        self
    }

    /// Declare a base kind, so fields accepting `base` accept this kind too.
    pub fn extends(mut self, base: &str) -> Self {
        self.schema.bases.push(base.to_string());
        self
    }

    pub fn param(self, name: &str, info: ParamInfo) -> Self {
        self.insert(name, FieldDescriptor::Param(info))
    }

    pub fn param_list(self, name: &str, info: ParamInfo, bounds: SizeBounds) -> Self {
        self.insert(name, FieldDescriptor::ParamList(info, bounds))
    }

    pub fn object(self, name: &str, info: ObjectInfo) -> Self {
        self.insert(name, FieldDescriptor::Object(info))
    }

    pub fn object_list(self, name: &str, info: ObjectInfo, bounds: SizeBounds) -> Self {
        self.insert(name, FieldDescriptor::ObjectList(info, bounds))
    }

    /// Mark the kind as a refinement-session root whose refine set lives in
    /// the singleton field `name`.
    pub fn refine_session(mut self, name: &str) -> Self {
        self.schema.session_field = Some(name.to_string());
        self.object(name, ObjectInfo::of(crate::refine::REFINE_SET_KIND))
    }

    /// Finish a declaration known to be valid.
    pub(crate) fn build_unchecked(self) -> NodeSchema {
        self.schema
    }

    /// Finish the declaration, checking defaults and size bounds.
    pub fn build(self) -> Result<NodeSchema> {
        let kind = self.schema.kind.clone();
        let invalid = |message: String| ModelError::InvalidSchema {
            kind: kind.clone(),
            message,
        };

        if let Some(name) = self.duplicates.first() {
            return Err(invalid(format!("field '{}' is declared twice", name)));
        }

        for (name, field) in &self.schema.fields {
            match field {
                FieldDescriptor::Param(info) => {
                    info.convert(name, info.default_value())
                        .map_err(|e| invalid(e.to_string()))?;
                }
                FieldDescriptor::ParamList(info, bounds) => {
                    info.convert(name, info.default_value())
                        .map_err(|e| invalid(e.to_string()))?;
                    if !bounds.is_consistent() {
                        return Err(invalid(format!("'{}' has min size above max size", name)));
                    }
                }
                FieldDescriptor::ObjectList(_, bounds) => {
                    if !bounds.is_consistent() {
                        return Err(invalid(format!("'{}' has min size above max size", name)));
                    }
                }
                FieldDescriptor::Object(_) => {}
            }
        }

        Ok(self.schema)
    }
}
