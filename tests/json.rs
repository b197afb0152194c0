use el::{evaluate, evaluate_with_json, json_to_value, value_to_json, ErrorKind, RangeType, Value};
use serde_json::json;

#[test]
fn json_variables() {
    let vars = r#"{"price": 2.5, "items": [1, 2, 3], "user": {"name": "alice"}, "flag": true, "none": null}"#;
    assert_eq!(evaluate_with_json("price * 2", vars).unwrap(), Value::from(5.0));
    assert_eq!(evaluate_with_json("items[-1]", vars).unwrap(), Value::from(3.0));
    assert_eq!(evaluate_with_json("user['name']", vars).unwrap(), Value::from("alice"));
    assert_eq!(evaluate_with_json("flag && none == null", vars).unwrap(), Value::from(true));
}

#[test]
fn invalid_json_is_rejected() {
    assert!(evaluate_with_json("1", "{not json").is_err());
    let err = evaluate_with_json("1", "[1, 2]").unwrap_err();
    assert!(err.message.contains("JSON must be an object"), "{}", err.message);
}

#[test]
fn objects_become_maps() {
    let value = json_to_value(json!({"b": [1, "two", null], "a": {"c": false}}));
    assert_eq!(value.to_string(), "{ \"a\": { \"c\": false }, \"b\": [ 1, \"two\", null ] }");
}

#[test]
fn values_back_to_json() {
    let value = evaluate("{a: [1..3], b: 'x', c: null, d: 1.5}").unwrap();
    assert_eq!(
        value_to_json(&value).unwrap(),
        json!({"a": [1.0, 2.0, 3.0], "b": "x", "c": null, "d": 1.5})
    );
    let document = json!({"list": [true, {"k": "v"}], "n": 4.25});
    assert_eq!(value_to_json(&json_to_value(document.clone())).unwrap(), document);
}

#[test]
fn bounded_ranges_materialize() {
    assert_eq!(value_to_json(&Value::from(RangeType::bounded(2, 0))).unwrap(), json!([2, 1, 0]));
}

#[test]
fn unrepresentable_values() {
    let open = Value::from(RangeType::LeftBounded { first: 0 });
    assert_eq!(value_to_json(&open).unwrap_err().kind, ErrorKind::Conversion);
    assert_eq!(value_to_json(&Value::undefined()).unwrap_err().kind, ErrorKind::Conversion);
    assert_eq!(value_to_json(&Value::from(f64::NAN)).unwrap(), json!(null));
}
