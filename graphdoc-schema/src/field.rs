use crate::{FieldErrors, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

const MSG_REQUIRED: &str = "Missing data for required field.";
const MSG_NULL: &str = "Field may not be null.";

/// The primitive shape of a declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    /// Homogeneous list; every item is converted with `items`.
    List { items: Box<FieldKind> },
    /// Any JSON object, passed through unchanged.
    Dict,
    /// Any JSON value, passed through unchanged.
    Raw,
    /// Object converted through its own schema.
    Nested { schema: Box<Schema> },
}

impl FieldKind {
    /// Returns the kind name used in messages and serialized descriptors.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::List { .. } => "list",
            FieldKind::Dict => "dict",
            FieldKind::Raw => "raw",
            FieldKind::Nested { .. } => "nested",
        }
    }

    /// Converts an incoming (non-null) value, coercing where the kind allows it.
    pub(crate) fn load(
        &self,
        path: &str,
        value: &Value,
        errors: &mut FieldErrors,
    ) -> Option<Value> {
        match self {
            FieldKind::String => match value {
                Value::String(_) => Some(value.clone()),
                _ => fail(errors, path, "Not a valid string."),
            },
            FieldKind::Integer => match load_integer(value) {
                Some(v) => Some(v),
                None => fail(errors, path, "Not a valid integer."),
            },
            FieldKind::Float => match value {
                Value::Number(_) => Some(value.clone()),
                Value::String(s) => {
                    match s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
                        Some(n) => Some(Value::Number(n)),
                        None => fail(errors, path, "Not a valid number."),
                    }
                }
                _ => fail(errors, path, "Not a valid number."),
            },
            FieldKind::Boolean => match load_boolean(value) {
                Some(b) => Some(Value::Bool(b)),
                None => fail(errors, path, "Not a valid boolean."),
            },
            FieldKind::List { items } => {
                let Value::Array(values) = value else {
                    return fail(errors, path, "Not a valid list.");
                };
                let before = errors.len();
                let out: Vec<Value> = values
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        let item_path = join_path(path, &i.to_string());
                        if item.is_null() {
                            errors.push(item_path, MSG_NULL);
                            return None;
                        }
                        items.load(&item_path, item, errors)
                    })
                    .collect();
                (errors.len() == before).then_some(Value::Array(out))
            }
            FieldKind::Dict => match value {
                Value::Object(_) => Some(value.clone()),
                _ => fail(errors, path, "Not a valid mapping type."),
            },
            FieldKind::Raw => Some(value.clone()),
            FieldKind::Nested { schema } => {
                let Value::Object(map) = value else {
                    return fail(errors, path, "Not a valid mapping type.");
                };
                let before = errors.len();
                let out = schema.load_fields(path, map, errors);
                (errors.len() == before).then_some(Value::Object(out))
            }
        }
    }

    /// Converts an outgoing (non-null) value. Strings are never coerced on dump,
    /// and whatever dumps cleanly loads back unchanged.
    pub(crate) fn dump(
        &self,
        path: &str,
        value: &Value,
        errors: &mut FieldErrors,
    ) -> Option<Value> {
        match self {
            FieldKind::String => match value {
                Value::String(_) => Some(value.clone()),
                _ => fail(errors, path, "Not a valid string."),
            },
            FieldKind::Integer => match value {
                Value::Number(_) => match load_integer(value) {
                    Some(v) => Some(v),
                    None => fail(errors, path, "Not a valid integer."),
                },
                _ => fail(errors, path, "Not a valid integer."),
            },
            FieldKind::Float => match value {
                Value::Number(_) => Some(value.clone()),
                _ => fail(errors, path, "Not a valid number."),
            },
            FieldKind::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                _ => fail(errors, path, "Not a valid boolean."),
            },
            FieldKind::List { items } => {
                let Value::Array(values) = value else {
                    return fail(errors, path, "Not a valid list.");
                };
                let before = errors.len();
                let out: Vec<Value> = values
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        let item_path = join_path(path, &i.to_string());
                        if item.is_null() {
                            errors.push(item_path, MSG_NULL);
                            return None;
                        }
                        items.dump(&item_path, item, errors)
                    })
                    .collect();
                (errors.len() == before).then_some(Value::Array(out))
            }
            FieldKind::Dict => match value {
                Value::Object(_) => Some(value.clone()),
                _ => fail(errors, path, "Not a valid mapping type."),
            },
            FieldKind::Raw => Some(value.clone()),
            FieldKind::Nested { schema } => {
                let Value::Object(map) = value else {
                    return fail(errors, path, "Not a valid mapping type.");
                };
                let before = errors.len();
                let out = schema.dump_fields(path, map, errors);
                (errors.len() == before).then_some(Value::Object(out))
            }
        }
    }
}

fn load_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| Value::from(f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn load_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn fail(errors: &mut FieldErrors, path: &str, message: &str) -> Option<Value> {
    errors.push(path, message);
    None
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// A validation rule checked after a value has been loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Bounds on string length (in characters), list length or object size.
    Length {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// Inclusive numeric bounds.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Value must equal one of the choices.
    OneOf { choices: Vec<Value> },
}

impl Rule {
    fn check(&self, value: &Value) -> Option<String> {
        match self {
            Rule::Length { min, max } => {
                let len = match value {
                    Value::String(s) => s.chars().count(),
                    Value::Array(a) => a.len(),
                    Value::Object(o) => o.len(),
                    _ => return None,
                };
                if let Some(min) = min.filter(|m| len < *m) {
                    return Some(format!("Shorter than minimum length {min}."));
                }
                if let Some(max) = max.filter(|m| len > *m) {
                    return Some(format!("Longer than maximum length {max}."));
                }
                None
            }
            Rule::Range { min, max } => {
                let n = value.as_f64()?;
                if let Some(min) = min.filter(|m| n < *m) {
                    return Some(format!("Must be at least {min}."));
                }
                if let Some(max) = max.filter(|m| n > *m) {
                    return Some(format!("Must be at most {max}."));
                }
                None
            }
            Rule::OneOf { choices } => {
                (!choices.contains(value)).then(|| "Not a valid choice.".to_string())
            }
        }
    }
}

/// A declared field: its kind, whether it must be present, whether `null`
/// is accepted, an optional default and any validation rules.
///
/// `null` stands for "unset": optional fields always accept it, required
/// fields only with `allow_none`.
///
/// Descriptors are immutable once attached to a schema; the builder methods
/// consume and return `self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub allow_none: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

impl FieldDescriptor {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            allow_none: false,
            default: None,
            rules: Vec::new(),
        }
    }

    /// Shorthand for a string field.
    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    /// Shorthand for an integer field.
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    /// Shorthand for a float field.
    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    /// Shorthand for a boolean field.
    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// Shorthand for a list field whose items have the given kind.
    pub fn list(items: FieldKind) -> Self {
        Self::new(FieldKind::List {
            items: Box::new(items),
        })
    }

    /// Shorthand for a free-form object field.
    pub fn dict() -> Self {
        Self::new(FieldKind::Dict)
    }

    /// Shorthand for an unconverted field.
    pub fn raw() -> Self {
        Self::new(FieldKind::Raw)
    }

    /// Shorthand for an object field converted through `schema`.
    pub fn nested(schema: Schema) -> Self {
        Self::new(FieldKind::Nested {
            schema: Box::new(schema),
        })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    /// Value used when the field is absent from the input.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Initial value given to a freshly constructed instance.
    pub fn initial_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }

    /// Loads one field from its raw input, or `None` when it should be
    /// omitted from the output (absent with no default, or failed).
    pub(crate) fn load(
        &self,
        path: &str,
        input: Option<&Value>,
        errors: &mut FieldErrors,
    ) -> Option<Value> {
        let value = match input {
            None => {
                if let Some(default) = &self.default {
                    return Some(default.clone());
                }
                if self.required {
                    errors.push(path, MSG_REQUIRED);
                }
                return None;
            }
            Some(Value::Null) if self.allow_none || !self.required => return Some(Value::Null),
            Some(Value::Null) => return fail(errors, path, MSG_NULL),
            Some(value) => value,
        };

        let loaded = self.kind.load(path, value, errors)?;
        let mut valid = true;
        for rule in &self.rules {
            if let Some(message) = rule.check(&loaded) {
                errors.push(path, message);
                valid = false;
            }
        }
        valid.then_some(loaded)
    }

    /// Dumps one attribute of an instance. `null` always passes.
    pub(crate) fn dump(
        &self,
        path: &str,
        attribute: Option<Value>,
        errors: &mut FieldErrors,
    ) -> Option<Value> {
        match attribute {
            None => self.default.clone(),
            Some(Value::Null) => Some(Value::Null),
            Some(value) => self.kind.dump(path, &value, errors),
        }
    }
}
