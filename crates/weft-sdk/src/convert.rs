//! Value conversion traits
//!
//! Ergonomic conversions between Rust types and [`Value`] for hook and
//! handler code.

use crate::error::Exception;
use crate::value::Value;

/// Convert a Rust type into a [`Value`].
pub trait IntoValue {
    /// Perform the conversion
    fn into_value(self) -> Value;
}

/// Convert a [`Value`] into a Rust type.
pub trait FromValue: Sized {
    /// Perform the conversion, failing on a kind mismatch
    fn from_value(value: &Value) -> Result<Self, Exception>;
}

fn mismatch(expected: &str, got: &Value) -> Exception {
    Exception::new(format!(
        "type mismatch: expected {}, got {}",
        expected,
        got.kind_name()
    ))
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::int(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::int(self as i64)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::float(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::bool(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::str(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(inner) => inner.into_value(),
            None => Value::Null,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, Exception> {
        value.as_int().ok_or_else(|| mismatch("int", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, Exception> {
        value.as_float().ok_or_else(|| mismatch("float", value))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, Exception> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, Exception> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch("string", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, Exception> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
