//! Scalar bind values for dynamically built statements.
//!
//! A [`Value`] is what a fragment builder binds to a `$n` placeholder. Because
//! the concrete Rust type of a field is only known at runtime (a partial update
//! may touch any subset of columns), `Value` adapts its wire encoding to the
//! parameter type Postgres inferred for the placeholder: an `Int` bound against
//! an `integer` column is sent as `int4`, against `numeric` as a decimal, etc.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType};

/// A single scalar bound to a positional placeholder.
///
/// `Null` is an explicit "set to NULL" instruction. It is distinct from a field
/// that is absent from a [`FieldUpdates`](crate::FieldUpdates) set, which leaves
/// the column unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
}

impl Value {
    /// Whether this value binds SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Human-readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
        }
    }
}

fn encode<T: ToSql>(
    value: &T,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if !T::accepts(ty) {
        return Err(Box::new(WrongType::new::<T>(ty.clone())));
    }
    value.to_sql(ty, out)
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => encode(b, ty, out),
            Value::Int(n) => match *ty {
                Type::INT2 => encode(&i16::try_from(*n)?, ty, out),
                Type::INT4 => encode(&i32::try_from(*n)?, ty, out),
                Type::FLOAT4 => encode(&(*n as f32), ty, out),
                Type::FLOAT8 => encode(&(*n as f64), ty, out),
                Type::NUMERIC => encode(&Decimal::from(*n), ty, out),
                _ => encode(n, ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => encode(&(*f as f32), ty, out),
                Type::NUMERIC => encode(&Decimal::try_from(*f)?, ty, out),
                _ => encode(f, ty, out),
            },
            Value::Decimal(d) => encode(d, ty, out),
            Value::Text(s) => encode(s, ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::NUMERIC
        ) || <String as ToSql>::accepts(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = JoblyError;

    fn try_from(v: serde_json::Value) -> JoblyResult<Self> {
        match v {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n
                    .as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| JoblyError::validation(format!("number out of range: {n}"))),
            },
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Array(_) => {
                Err(JoblyError::validation("expected a scalar, got an array"))
            }
            serde_json::Value::Object(_) => {
                Err(JoblyError::validation("expected a scalar, got an object"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoded(value: &Value, ty: &Type) -> Result<(IsNull, Vec<u8>), String> {
        let mut out = BytesMut::new();
        value
            .to_sql_checked(ty, &mut out)
            .map(|is_null| (is_null, out.to_vec()))
            .map_err(|e| e.to_string())
    }

    #[test]
    fn null_binds_sql_null_for_any_accepted_type() {
        for ty in [Type::INT4, Type::TEXT, Type::NUMERIC, Type::BOOL] {
            let (is_null, bytes) = encoded(&Value::Null, &ty).unwrap();
            assert!(matches!(is_null, IsNull::Yes));
            assert!(bytes.is_empty());
        }
    }

    #[test]
    fn int_narrows_to_the_inferred_column_width() {
        let (_, int4) = encoded(&Value::Int(150), &Type::INT4).unwrap();
        assert_eq!(int4, 150_i32.to_be_bytes());

        let (_, int8) = encoded(&Value::Int(150), &Type::INT8).unwrap();
        assert_eq!(int8, 150_i64.to_be_bytes());

        assert!(encoded(&Value::Int(i64::MAX), &Type::INT4).is_err());
    }

    #[test]
    fn float_and_int_encode_as_numeric() {
        assert!(encoded(&Value::Float(0.5), &Type::NUMERIC).is_ok());
        assert!(encoded(&Value::Int(3), &Type::NUMERIC).is_ok());
        assert!(encoded(&Value::Float(0.5), &Type::FLOAT8).is_ok());
    }

    #[test]
    fn mismatched_types_are_rejected() {
        assert!(encoded(&Value::Text("abc".into()), &Type::INT4).is_err());
        assert!(encoded(&Value::Bool(true), &Type::TEXT).is_err());
        assert!(encoded(&Value::Int(1), &Type::DATE).is_err());
    }

    #[test]
    fn converts_from_json_scalars() {
        assert_eq!(Value::try_from(json!(null)).unwrap(), Value::Null);
        assert_eq!(Value::try_from(json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(Value::try_from(json!(500)).unwrap(), Value::Int(500));
        assert_eq!(Value::try_from(json!(0.5)).unwrap(), Value::Float(0.5));
        assert_eq!(
            Value::try_from(json!("New")).unwrap(),
            Value::Text("New".to_string())
        );
    }

    #[test]
    fn json_containers_are_not_scalars() {
        assert!(Value::try_from(json!([1, 2])).unwrap_err().is_validation());
        assert!(Value::try_from(json!({"a": 1})).unwrap_err().is_validation());
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7)), Value::Int(7));
    }
}
