use crate::{DataError, JsonValue, Result, canonical_json, truncate_long};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::mem;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

/// Dynamically typed value.
///
/// Every variant carries an `Option`: `None` is a typed NULL, which is how column
/// definitions describe their type (`Value::Int64(None)` is "an INT64 column").
/// `List` also remembers the element type so that empty or NULL arrays stay typed.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Timestamp(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    Json(Option<JsonValue>),
    List(Option<Vec<Value>>, /* type: */ Box<Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Json(l), Self::Json(r)) => l == r,
            (Self::List(l, ..), Self::List(r, ..)) => l == r && self.same_type(other),
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(.., l), Self::List(.., r)) => l.same_type(r),
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Boolean(None)
                | Value::Int64(None)
                | Value::Float32(None)
                | Value::Float64(None)
                | Value::Decimal(None)
                | Value::Varchar(None)
                | Value::Blob(None)
                | Value::Date(None)
                | Value::Timestamp(None)
                | Value::Uuid(None)
                | Value::Json(None)
                | Value::List(None, ..)
        )
    }

    /// The NULL of the same type.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int64(..) => Value::Int64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::Uuid(..) => Value::Uuid(None),
            Value::Json(..) => Value::Json(None),
            Value::List(.., inner) => Value::List(None, inner.clone()),
        }
    }

    /// Converts this value to the type described by `ty`.
    ///
    /// Only lossless widenings are performed (integer to float or decimal, uuid to and from
    /// its string form, RFC 3339 strings to timestamps). Anything else is a
    /// [`DataError::TypeMismatch`], structured JSON in particular is never produced from a string.
    pub fn try_as(self, ty: &Value) -> Result<Value> {
        if self.same_type(ty) {
            return Ok(self);
        }
        if self.is_null() {
            return Ok(ty.as_null());
        }
        let mismatch = |value: &Value| -> crate::Error {
            DataError::type_mismatch(format!("Cannot convert {:?} to the type of {:?}", value, ty))
                .into()
        };
        let result = match (self, ty) {
            (Value::Int64(Some(v)), Value::Float64(..)) => match exact_f64(v) {
                Some(v) => Value::Float64(Some(v)),
                None => return Err(mismatch(&Value::Int64(Some(v)))),
            },
            (Value::Int64(Some(v)), Value::Decimal(..)) => Value::Decimal(Some(v.into())),
            (Value::Float32(Some(v)), Value::Float64(..)) => Value::Float64(Some(v as f64)),
            (Value::Float64(Some(v)), Value::Decimal(..)) => match Decimal::from_f64(v) {
                Some(v) => Value::Decimal(Some(v)),
                None => return Err(mismatch(&Value::Float64(Some(v)))),
            },
            (Value::Uuid(Some(v)), Value::Varchar(..)) => Value::Varchar(Some(v.to_string())),
            (Value::Varchar(Some(v)), Value::Uuid(..)) => match Uuid::parse_str(&v) {
                Ok(v) => Value::Uuid(Some(v)),
                Err(..) => return Err(mismatch(&Value::Varchar(Some(v)))),
            },
            (Value::Varchar(Some(v)), Value::Timestamp(..)) => {
                match OffsetDateTime::parse(&v, &Rfc3339) {
                    Ok(v) => Value::Timestamp(Some(v)),
                    Err(..) => return Err(mismatch(&Value::Varchar(Some(v)))),
                }
            }
            (Value::List(Some(values), ..), Value::List(.., inner)) => Value::List(
                Some(
                    values
                        .into_iter()
                        .map(|v| v.try_as(inner))
                        .collect::<Result<_>>()?,
                ),
                inner.clone(),
            ),
            (value, ..) => return Err(mismatch(&value)),
        };
        Ok(result)
    }

    /// Short human readable form, used in logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Json(Some(v)) => {
                let json = canonical_json(v);
                format!("JSON {}", truncate_long!(json))
            }
            Value::Varchar(Some(v)) => format!("'{}'", truncate_long!(v)),
            v if v.is_null() => "NULL".into(),
            v => format!("{:?}", v),
        }
    }
}

/// Integers within ±2^53 are the ones a `f64` holds exactly.
pub(crate) fn exact_f64(v: i64) -> Option<f64> {
    const LIMIT: i64 = 1 << f64::MANTISSA_DIGITS;
    (-LIMIT..=LIMIT).contains(&v).then_some(v as f64)
}
