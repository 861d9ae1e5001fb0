#[cfg(test)]
mod tests {
    use cloudspan_core::{AsValue, DataError, DataErrorKind, Value};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::{Month, PrimitiveDateTime, macros::datetime};
    use uuid::Uuid;

    fn is_mismatch(result: cloudspan_core::Result<impl std::fmt::Debug>) -> bool {
        match result {
            Ok(..) => false,
            Err(e) => DataError::kind_of(&e) == Some(DataErrorKind::TypeMismatch),
        }
    }

    #[test]
    fn value_none() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert!(Value::Int64(None).is_null());
        assert!(!Value::Varchar(Some("".into())).is_null());
        assert_eq!(Value::Int64(None), Value::Int64(None));
        assert_ne!(Value::Int64(None), Value::Float64(None));
    }

    #[test]
    fn value_bool() {
        let val = true.as_value();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(None));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert!(bool::try_from_value(val).unwrap());
        assert!(is_mismatch(bool::try_from_value(1_i64.as_value())));
    }

    #[test]
    fn value_integers() {
        assert_eq!(127_i8.as_value(), Value::Int64(Some(127)));
        assert_eq!(u32::MAX.as_value(), Value::Int64(Some(u32::MAX as i64)));
        assert_eq!(i64::try_from_value(Value::Int64(Some(-5))).unwrap(), -5);
        assert_eq!(u8::try_from_value(Value::Int64(Some(255))).unwrap(), 255);
        assert!(is_mismatch(u8::try_from_value(Value::Int64(Some(256)))));
        assert!(is_mismatch(i32::try_from_value(Value::Int64(Some(
            i64::MAX
        )))));
        assert!(is_mismatch(i64::try_from_value(Value::Float64(Some(1.0)))));
        assert!(is_mismatch(i64::try_from_value("1".into())));
    }

    #[test]
    fn value_floats_and_decimals() {
        assert_eq!(0.5_f32.as_value(), Value::Float32(Some(0.5)));
        assert_eq!(f64::try_from_value(Value::Float32(Some(0.5))).unwrap(), 0.5);
        assert_eq!(f64::try_from_value(Value::Int64(Some(3))).unwrap(), 3.0);
        assert!(is_mismatch(f32::try_from_value(Value::Float64(Some(0.1)))));
        assert_eq!(
            f64::try_from_value(Value::Int64(Some(1 << 53))).unwrap(),
            9_007_199_254_740_992.0
        );
        // 2^53 + 1 has no exact f64.
        assert!(is_mismatch(f64::try_from_value(Value::Int64(Some(
            (1 << 53) + 1
        )))));
        assert!(is_mismatch(f64::try_from_value(Value::Int64(Some(i64::MIN)))));

        let decimal = Decimal::from_str("1234.5678").unwrap();
        assert_eq!(decimal.as_value(), Value::Decimal(Some(decimal)));
        assert_eq!(
            Decimal::try_from_value(Value::Int64(Some(12))).unwrap(),
            Decimal::from(12)
        );
        assert!(is_mismatch(Decimal::try_from_value(Value::Float64(Some(
            1.5
        )))));
    }

    #[test]
    fn value_strings_and_uuids() {
        let val: Value = "hello".into();
        assert_eq!(val, Value::Varchar(Some("hello".into())));
        assert_eq!(String::try_from_value(val).unwrap(), "hello");

        let uuid = Uuid::from_str("0193a7a4-2f5e-7cc1-8b6e-2b1a0f9c3d44").unwrap();
        assert_eq!(uuid.as_value(), Value::Uuid(Some(uuid)));
        assert_eq!(
            Uuid::try_from_value("0193a7a4-2f5e-7cc1-8b6e-2b1a0f9c3d44".into()).unwrap(),
            uuid
        );
        let error = Uuid::try_from_value("not-a-uuid".into()).expect_err("Not a uuid");
        assert_eq!(DataError::kind_of(&error), Some(DataErrorKind::TypeMismatch));
        assert!(error.to_string().contains("'not-a-uuid'"), "{}", error);
        assert!(is_mismatch(Uuid::try_from_value(7_i64.as_value())));
    }

    #[test]
    fn value_times() {
        let timestamp = datetime!(2025-06-01 12:00:00 +02:00);
        assert_eq!(timestamp.as_value(), Value::Timestamp(Some(timestamp)));
        let primitive = PrimitiveDateTime::try_from_value(timestamp.as_value()).unwrap();
        assert_eq!(primitive, datetime!(2025-06-01 10:00:00));
        assert_eq!(
            primitive.as_value(),
            Value::Timestamp(Some(datetime!(2025-06-01 10:00:00 UTC)))
        );
        assert_eq!(primitive.date().month(), Month::June);
    }

    #[test]
    fn value_options_and_lists() {
        assert_eq!(None::<i32>.as_value(), Value::Int64(None));
        assert_eq!(Some(4_i32).as_value(), Value::Int64(Some(4)));
        assert_eq!(Option::<i32>::try_from_value(Value::Int64(None)).unwrap(), None);
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);

        let list = vec!["a".to_string(), "b".to_string()].as_value();
        assert_eq!(
            list,
            Value::List(
                Some(vec!["a".into(), "b".into()]),
                Box::new(Value::Varchar(None))
            )
        );
        assert_eq!(
            Vec::<String>::try_from_value(list).unwrap(),
            ["a".to_string(), "b".to_string()]
        );
        // Same elements, different declared type.
        assert_ne!(
            Value::List(Some(vec![]), Box::new(Value::Int64(None))),
            Value::List(Some(vec![]), Box::new(Value::Varchar(None)))
        );
    }

    #[test]
    fn try_as_widens_only() {
        assert_eq!(
            Value::Int64(Some(2)).try_as(&Value::Float64(None)).unwrap(),
            Value::Float64(Some(2.0))
        );
        assert_eq!(
            Value::Int64(Some(2)).try_as(&Value::Decimal(None)).unwrap(),
            Value::Decimal(Some(Decimal::from(2)))
        );
        assert_eq!(
            Value::from("2025-01-02T03:04:05Z")
                .try_as(&Value::Timestamp(None))
                .unwrap(),
            Value::Timestamp(Some(datetime!(2025-01-02 03:04:05 UTC)))
        );
        assert_eq!(
            Value::Null.try_as(&Value::Json(None)).unwrap(),
            Value::Json(None)
        );
        assert!(is_mismatch(
            Value::Float64(Some(2.5)).try_as(&Value::Int64(None))
        ));
        assert!(is_mismatch(
            Value::Int64(Some(i64::MAX)).try_as(&Value::Float64(None))
        ));
        assert!(is_mismatch(
            Value::from("{\"a\":1}").try_as(&Value::Json(None))
        ));
        assert!(is_mismatch(
            Value::from("yesterday").try_as(&Value::Timestamp(None))
        ));
        assert_eq!(
            vec![1_i64, 2]
                .as_value()
                .try_as(&Vec::<f64>::as_empty_value())
                .unwrap(),
            vec![1.0_f64, 2.0].as_value()
        );
    }

    #[test]
    fn describe() {
        assert_eq!(Value::Int64(None).describe(), "NULL");
        assert_eq!(Value::from("text").describe(), "'text'");
        assert_eq!(
            Value::Json(Some(cloudspan_core::json!({"b": 1, "a": 2}))).describe(),
            r#"JSON {"a":2,"b":1}"#
        );
    }
}
