//! Value transforms: per-type codecs applied to attribute values on the write path.
//!
//! Transforms are resolved by key (`"transform:" + declared type`) from a
//! [`TransformRegistry`] that is handed to the serializer when it is built.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// used for the date and datetime codecs
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
// used for the decimal codec
use bigdecimal::BigDecimal;
use serde_json::{Number, Value};

use crate::schema::OtherHasher;

pub const TRANSFORM_PREFIX: &str = "transform:";

pub fn transform_key(declared_type: &str) -> String {
    format!("{TRANSFORM_PREFIX}{declared_type}")
}

pub trait Transform: Send + Sync {
    /// Converts an attribute value into its wire form. The error is a
    /// human readable reason, wrapped by the caller with attribute context.
    fn serialize(&self, value: &Value) -> Result<Value, String>;
}

/// Codecs shipped with the crate, each registered under its `DATA_TYPE`.
pub trait BuiltinTransform: Transform + Default + 'static {
    const DATA_TYPE: &'static str;
}

/// Adapts a closure into a [`Transform`].
pub struct FnTransform<F>(pub F);

impl<F> Transform for FnTransform<F>
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    fn serialize(&self, value: &Value) -> Result<Value, String> {
        (self.0)(value)
    }
}

// ------------- Registry --------------
#[derive(Default, Clone)]
pub struct TransformRegistry {
    kept: HashMap<String, Arc<dyn Transform>, OtherHasher>,
}

impl TransformRegistry {
    /// An empty registry; every attribute type must be registered by the caller.
    pub fn new() -> Self {
        Self { kept: HashMap::default() }
    }
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_builtin::<StringTransform>();
        registry.register_builtin::<NumberTransform>();
        registry.register_builtin::<BooleanTransform>();
        registry.register_builtin::<DateTransform>();
        registry.register_builtin::<DateTimeTransform>();
        registry.register_builtin::<DecimalTransform>();
        registry
    }
    pub fn register_builtin<T: BuiltinTransform>(&mut self) -> &mut Self {
        self.register(T::DATA_TYPE, T::default())
    }
    /// Registers a codec for a declared type, replacing any codec already registered for it.
    pub fn register<T: Transform + 'static>(&mut self, declared_type: &str, transform: T) -> &mut Self {
        self.kept.insert(transform_key(declared_type), Arc::new(transform));
        self
    }
    pub fn register_fn<F>(&mut self, declared_type: &str, f: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(declared_type, FnTransform(f))
    }
    /// Looks a codec up by its full key, e.g. `"transform:string"`.
    pub fn lookup(&self, key: &str) -> Option<&dyn Transform> {
        self.kept.get(key).map(|t| t.as_ref())
    }
    pub fn transform_for(&self, declared_type: &str) -> Option<&dyn Transform> {
        self.lookup(&transform_key(declared_type))
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut keys: Vec<&String> = self.kept.keys().collect();
        keys.sort();
        f.debug_struct("TransformRegistry").field("kept", &keys).finish()
    }
}

// ------------- Built-in codecs --------------
#[derive(Debug, Default, Clone, Copy)]
pub struct StringTransform;

impl Transform for StringTransform {
    fn serialize(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Null | Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(format!("expected a scalar, found {other}")),
        }
    }
}
impl BuiltinTransform for StringTransform {
    const DATA_TYPE: &'static str = "string";
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NumberTransform;

impl Transform for NumberTransform {
    fn serialize(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Null | Value::Number(_) => Ok(value.clone()),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
            Value::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(Value::from(i));
                }
                if let Ok(u) = s.parse::<u64>() {
                    return Ok(Value::from(u));
                }
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("'{s}' is not a number"))
            }
            other => Err(format!("expected a number, found {other}")),
        }
    }
}
impl BuiltinTransform for NumberTransform {
    const DATA_TYPE: &'static str = "number";
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanTransform;

impl Transform for BooleanTransform {
    fn serialize(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Null | Value::Bool(_) => Ok(value.clone()),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "t" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "0" | "" => Ok(Value::Bool(false)),
                _ => Err(format!("'{s}' is not a boolean")),
            },
            Value::Number(n) => Ok(Value::Bool(n.as_f64() == Some(1.0))),
            other => Err(format!("expected a boolean, found {other}")),
        }
    }
}
impl BuiltinTransform for BooleanTransform {
    const DATA_TYPE: &'static str = "boolean";
}

// Accepts RFC 3339, naive datetimes, plain dates and epoch milliseconds.
fn parse_moment(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = NaiveDateTime::from_str(s) {
                return Ok(dt.and_utc());
            }
            NaiveDate::from_str(s)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| format!("'{s}' is not a date"))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| format!("{n} is not a timestamp in milliseconds")),
        other => Err(format!("expected a date, found {other}")),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DateTransform;

impl Transform for DateTransform {
    fn serialize(&self, value: &Value) -> Result<Value, String> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let moment = parse_moment(value)?;
        Ok(Value::String(moment.date_naive().format("%Y-%m-%d").to_string()))
    }
}
impl BuiltinTransform for DateTransform {
    const DATA_TYPE: &'static str = "date";
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DateTimeTransform;

impl Transform for DateTimeTransform {
    fn serialize(&self, value: &Value) -> Result<Value, String> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let moment = parse_moment(value)?;
        Ok(Value::String(moment.to_rfc3339_opts(SecondsFormat::Millis, true)))
    }
}
impl BuiltinTransform for DateTimeTransform {
    const DATA_TYPE: &'static str = "datetime";
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalTransform;

impl Transform for DecimalTransform {
    fn serialize(&self, value: &Value) -> Result<Value, String> {
        let text = match value {
            Value::Null => return Ok(Value::Null),
            Value::String(s) => s.trim().to_owned(),
            Value::Number(n) => n.to_string(),
            other => return Err(format!("expected a decimal, found {other}")),
        };
        BigDecimal::from_str(&text)
            .map(|d| Value::String(d.to_string()))
            .map_err(|_| format!("'{text}' is not a decimal"))
    }
}
impl BuiltinTransform for DecimalTransform {
    const DATA_TYPE: &'static str = "decimal";
}
