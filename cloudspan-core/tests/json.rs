#[cfg(test)]
mod tests {
    use cloudspan_core::{
        DataError, DataErrorKind, JsonValue, canonical_json, json, parse_json,
    };
    use indoc::indoc;

    #[test]
    fn canonical_form_ignores_insertion_order() {
        let mut first = serde_json::Map::new();
        first.insert("zebra".into(), json!(1));
        first.insert("apple".into(), json!({"y": [true, null], "x": -2.5}));
        let mut second = serde_json::Map::new();
        second.insert("apple".into(), json!({"x": -2.5, "y": [true, null]}));
        second.insert("zebra".into(), json!(1));
        let first = canonical_json(&JsonValue::Object(first));
        let second = canonical_json(&JsonValue::Object(second));
        assert_eq!(first, second);
        assert_eq!(first, r#"{"apple":{"x":-2.5,"y":[true,null]},"zebra":1}"#);
    }

    #[test]
    fn keys_sorted_by_bytes() {
        let value = json!({"b": 0, "B": 0, "ä": 0, "a": 0, "": 0});
        assert_eq!(canonical_json(&value), r#"{"":0,"B":0,"a":0,"b":0,"ä":0}"#);
    }

    #[test]
    fn arrays_keep_their_order() {
        assert_eq!(canonical_json(&json!([3, 1, 2])), "[3,1,2]");
        assert_eq!(canonical_json(&json!([])), "[]");
        assert_eq!(canonical_json(&json!({})), "{}");
    }

    #[test]
    fn parse_then_canonical() {
        let input = indoc! {r#"
            {
                "name": "Main Hall",
                "capacity": 1200,
                "tags": ["indoor", "seated"],
                "address": {"street": "Via Roma 1", "city": "Torino"}
            }
        "#};
        let value = parse_json(input).expect("Could not parse the JSON");
        let canonical = canonical_json(&value);
        assert_eq!(
            canonical,
            r#"{"address":{"city":"Torino","street":"Via Roma 1"},"capacity":1200,"name":"Main Hall","tags":["indoor","seated"]}"#
        );
        assert_eq!(parse_json(&canonical).unwrap(), value);
    }

    #[test]
    fn invalid_json_is_a_type_mismatch() {
        let error = parse_json("{\"a\": }").expect_err("The input is not JSON");
        assert_eq!(DataError::kind_of(&error), Some(DataErrorKind::TypeMismatch));
    }
}
