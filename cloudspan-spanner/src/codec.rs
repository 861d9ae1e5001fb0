//! Conversion between [`Value`] and the typed wire representation.
//!
//! Every function here is pure. A value has exactly one encoded form: JSON goes through the
//! canonical serialization, timestamps are always written in UTC.
use crate::{SpannerType, TypeCode, WireValue};
use base64::{Engine, engine::general_purpose::STANDARD};
use cloudspan_core::{DataError, Error, Result, Value, canonical_json, parse_json, truncate_long};
use rust_decimal::Decimal;
use std::str::FromStr;
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

/// Value accepted by commit timestamp columns, replaced by the commit time of the transaction.
pub const PENDING_COMMIT_TIMESTAMP: &str = "spanner.commit_timestamp()";

/// Marker for the [`PENDING_COMMIT_TIMESTAMP`] sentinel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommitTimestamp;

impl From<PendingCommitTimestamp> for Value {
    fn from(_: PendingCommitTimestamp) -> Self {
        Value::Varchar(Some(PENDING_COMMIT_TIMESTAMP.into()))
    }
}

fn mismatch(message: String) -> Error {
    DataError::type_mismatch(message).into()
}

/// The wire type of `value`, `None` for the untyped [`Value::Null`].
pub fn spanner_type(value: &Value) -> Result<Option<SpannerType>> {
    Ok(Some(SpannerType::scalar(match value {
        Value::Null => return Ok(None),
        Value::Boolean(..) => TypeCode::Bool,
        Value::Int64(..) => TypeCode::Int64,
        Value::Float32(..) => TypeCode::Float32,
        Value::Float64(..) => TypeCode::Float64,
        Value::Decimal(..) => TypeCode::Numeric,
        Value::Varchar(..) | Value::Uuid(..) => TypeCode::String,
        Value::Blob(..) => TypeCode::Bytes,
        Value::Date(..) => TypeCode::Date,
        Value::Timestamp(..) => TypeCode::Timestamp,
        Value::Json(..) => TypeCode::Json,
        Value::List(.., inner) => {
            let Some(element) = spanner_type(inner)? else {
                return Err(mismatch(
                    "Arrays must declare the type of their elements".into(),
                ));
            };
            if element.code == TypeCode::Array {
                return Err(mismatch("Arrays of arrays are not supported".into()));
            }
            return Ok(Some(SpannerType::array(element)));
        }
    })))
}

/// Typed NULL matching `ty`.
pub fn value_type(ty: &SpannerType) -> Result<Value> {
    Ok(match ty.code {
        TypeCode::Bool => Value::Boolean(None),
        TypeCode::Int64 => Value::Int64(None),
        TypeCode::Float32 => Value::Float32(None),
        TypeCode::Float64 => Value::Float64(None),
        TypeCode::Numeric => Value::Decimal(None),
        TypeCode::String => Value::Varchar(None),
        TypeCode::Bytes => Value::Blob(None),
        TypeCode::Date => Value::Date(None),
        TypeCode::Timestamp => Value::Timestamp(None),
        TypeCode::Json => Value::Json(None),
        TypeCode::Array => {
            let Some(element) = &ty.array_element_type else {
                return Err(mismatch("ARRAY type without element type".into()));
            };
            Value::List(None, Box::new(value_type(element)?))
        }
    })
}

/// Encodes `value` with the type it carries.
pub fn encode(value: &Value) -> Result<(Option<SpannerType>, WireValue)> {
    Ok((spanner_type(value)?, encode_wire(value)?))
}

/// Encodes `value` as a value of `declared`, the type of the target column.
///
/// The value is first converted with [`Value::try_as`], so only lossless conversions happen.
/// TIMESTAMP columns also accept the [`PENDING_COMMIT_TIMESTAMP`] sentinel.
pub fn encode_as(value: Value, declared: &Value) -> Result<(Option<SpannerType>, WireValue)> {
    if let (Value::Timestamp(..), Value::Varchar(Some(v))) = (declared, &value)
        && v == PENDING_COMMIT_TIMESTAMP
    {
        return Ok((
            Some(SpannerType::scalar(TypeCode::Timestamp)),
            WireValue::String(PENDING_COMMIT_TIMESTAMP.into()),
        ));
    }
    if matches!(declared, Value::Null) {
        return encode(&value);
    }
    let value = value.try_as(declared)?;
    encode(&value)
}

fn encode_float(value: f64) -> WireValue {
    if value.is_nan() {
        "NaN".into()
    } else if value.is_infinite() {
        WireValue::String(if value > 0.0 { "Infinity" } else { "-Infinity" }.into())
    } else {
        WireValue::Number(value)
    }
}

fn encode_wire(value: &Value) -> Result<WireValue> {
    if value.is_null() {
        return Ok(WireValue::Null);
    }
    Ok(match value {
        Value::Boolean(Some(v)) => WireValue::Bool(*v),
        Value::Int64(Some(v)) => itoa::Buffer::new().format(*v).into(),
        Value::Float32(Some(v)) => encode_float(*v as f64),
        Value::Float64(Some(v)) => encode_float(*v),
        Value::Decimal(Some(v)) => v.to_string().into(),
        Value::Varchar(Some(v)) => v.as_str().into(),
        Value::Uuid(Some(v)) => v.hyphenated().to_string().into(),
        Value::Blob(Some(v)) => STANDARD.encode(v).into(),
        Value::Date(Some(v)) => {
            if !(1..=9999).contains(&v.year()) {
                return Err(mismatch(format!("Date {} is outside of 0001..=9999", v)));
            }
            v.format(format_description!("[year]-[month]-[day]"))
                .map_err(|e| mismatch(format!("Cannot format date {}: {}", v, e)))?
                .into()
        }
        // Rfc3339 drops trailing zeros of the fraction and rejects years it cannot represent.
        Value::Timestamp(Some(v)) => v
            .to_offset(UtcOffset::UTC)
            .format(&Rfc3339)
            .map_err(|e| mismatch(format!("Cannot format timestamp {}: {}", v, e)))?
            .into(),
        Value::Json(Some(v)) => canonical_json(v).into(),
        Value::List(Some(values), ..) => {
            WireValue::List(values.iter().map(encode_wire).collect::<Result<_>>()?)
        }
        _ => WireValue::Null,
    })
}

/// Decodes a wire value of type `ty`.
///
/// The wire kind must be the one `ty` prescribes: an INT64 sent as a number or a BOOL sent as
/// a string is a [`DataError::TypeMismatch`], never coerced.
pub fn decode(ty: &SpannerType, wire: WireValue) -> Result<Value> {
    if wire == WireValue::Null {
        return value_type(ty);
    }
    let invalid = |wire: &WireValue| {
        let wire = format!("{:?}", wire);
        mismatch(format!("Cannot decode {} as {}", truncate_long!(wire), ty))
    };
    let result = match (ty.code, wire) {
        (TypeCode::Bool, WireValue::Bool(v)) => Value::Boolean(Some(v)),
        (TypeCode::Int64, WireValue::String(v)) => match v.parse::<i64>() {
            Ok(parsed) => Value::Int64(Some(parsed)),
            Err(..) => return Err(invalid(&WireValue::String(v))),
        },
        (TypeCode::Float64, wire) => {
            Value::Float64(Some(decode_float(&wire).ok_or_else(|| invalid(&wire))?))
        }
        (TypeCode::Float32, wire) => {
            Value::Float32(Some(decode_float(&wire).ok_or_else(|| invalid(&wire))? as f32))
        }
        (TypeCode::Numeric, WireValue::String(v)) => match Decimal::from_str(&v) {
            Ok(parsed) => Value::Decimal(Some(parsed)),
            Err(..) => return Err(invalid(&WireValue::String(v))),
        },
        (TypeCode::String, WireValue::String(v)) => Value::Varchar(Some(v)),
        (TypeCode::Bytes, WireValue::String(v)) => match STANDARD.decode(&v) {
            Ok(bytes) => Value::Blob(Some(bytes.into())),
            Err(..) => return Err(invalid(&WireValue::String(v))),
        },
        (TypeCode::Date, WireValue::String(v)) => {
            match Date::parse(&v, format_description!("[year]-[month]-[day]")) {
                Ok(date) => Value::Date(Some(date)),
                Err(..) => return Err(invalid(&WireValue::String(v))),
            }
        }
        (TypeCode::Timestamp, WireValue::String(v)) => match OffsetDateTime::parse(&v, &Rfc3339) {
            Ok(timestamp) => Value::Timestamp(Some(timestamp.to_offset(UtcOffset::UTC))),
            Err(..) => return Err(invalid(&WireValue::String(v))),
        },
        (TypeCode::Json, WireValue::String(v)) => Value::Json(Some(parse_json(&v)?)),
        (TypeCode::Array, WireValue::List(values)) => {
            let Some(element) = &ty.array_element_type else {
                return Err(mismatch("ARRAY type without element type".into()));
            };
            Value::List(
                Some(
                    values
                        .into_iter()
                        .map(|v| decode(element, v))
                        .collect::<Result<_>>()?,
                ),
                Box::new(value_type(element)?),
            )
        }
        (.., wire) => return Err(invalid(&wire)),
    };
    Ok(result)
}

fn decode_float(wire: &WireValue) -> Option<f64> {
    match wire {
        WireValue::Number(v) => Some(*v),
        WireValue::String(v) => match v.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudspan_core::{AsValue, DataErrorKind};
    use time::{Month, macros::datetime};

    fn wire(value: Value) -> Result<WireValue> {
        encode_wire(&value)
    }

    #[test]
    fn timestamps_are_utc() {
        let first = Date::from_calendar_date(1, Month::January, 1)
            .unwrap()
            .with_hms_nano(0, 0, 0, 1)
            .unwrap()
            .assume_utc();
        let value = datetime!(2025-03-04 10:20:30.1234 +02:00);
        assert_eq!(
            wire(value.into()).unwrap(),
            WireValue::from("2025-03-04T08:20:30.1234Z")
        );
        assert_eq!(
            wire(datetime!(2025-03-04 10:20:30 UTC).into()).unwrap(),
            WireValue::from("2025-03-04T10:20:30Z")
        );
        assert_eq!(
            wire(first.into()).unwrap(),
            WireValue::from("0001-01-01T00:00:00.000000001Z")
        );
    }

    #[test]
    fn years_out_of_range() {
        let timestamp = Date::MIN.midnight().assume_utc();
        let error = wire(timestamp.into()).expect_err("Year -9999 has no RFC 3339 form");
        assert_eq!(DataError::kind_of(&error), Some(DataErrorKind::TypeMismatch));

        let error = wire(Date::MIN.into()).expect_err("Year -9999 is not a valid DATE");
        assert_eq!(DataError::kind_of(&error), Some(DataErrorKind::TypeMismatch));

        // Inside a list the whole array fails.
        let error = wire(vec![Date::MAX, Date::MIN].as_value()).expect_err("One date is invalid");
        assert_eq!(DataError::kind_of(&error), Some(DataErrorKind::TypeMismatch));
    }

    #[test]
    fn special_floats() {
        assert_eq!(encode_float(f64::NAN), WireValue::String("NaN".into()));
        assert_eq!(
            encode_float(f64::NEG_INFINITY),
            WireValue::String("-Infinity".into())
        );
        assert_eq!(decode_float(&"Infinity".into()), Some(f64::INFINITY));
        assert_eq!(decode_float(&WireValue::Bool(true)), None);
    }
}
