//! Integration tests for array, hash and options nodes.

use formnode::{ArrayMode, CleanError, JsonPath, Node, NodeLike};
use serde_json::{json, Value};
use stillwater::Validation;

fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
    v.into_result().unwrap_err()
}

fn pairs(node: &Node, value: Value) -> Vec<(String, String)> {
    unwrap_failure(node.valid(&value, &JsonPath::root())).pairs()
}

fn compile(fragment: Value) -> Node {
    Node::from_value(&fragment).unwrap()
}

#[test]
fn test_array_of_records() {
    let node = compile(json!({
        "__array__": "unique",
        "name": "string",
        "qty": "uint"
    }));
    let array = node.as_array().unwrap();
    assert_eq!(array.mode(), ArrayMode::Unique);
    assert_eq!(array.child().class_name(), "Parent");

    assert!(node.is_valid(&json!([{"name": "a", "qty": 1}, {"name": "b", "qty": 1}])));
    assert_eq!(
        pairs(&node, json!([{"name": "a", "qty": 1}, {"name": "a", "qty": -1}, {"qty": 2}])),
        vec![
            ("[1].qty".to_string(), "signed".to_string()),
            ("[2].name".to_string(), "missing".to_string()),
        ]
    );
}

#[test]
fn test_array_uniqueness_by_mode() {
    let unique = compile(json!({"__array__": "unique", "__type__": "int"}));
    let duplicates = compile(json!({"__array__": "duplicates", "__type__": "int"}));

    let value = json!([4, 5, 4]);
    assert_eq!(
        pairs(&unique, value.clone()),
        vec![("[2]".to_string(), "duplicate of [0]".to_string())]
    );
    assert!(duplicates.is_valid(&value));
}

#[test]
fn test_array_counts() {
    let node = compile(json!({
        "__array__": {"type": "duplicates", "minimum": 1, "maximum": "2"},
        "__type__": "md5"
    }));
    assert_eq!(node.as_array().map(|a| a.minmax()), Some((Some(1), Some(2))));
    assert_eq!(pairs(&node, json!([])), vec![("".to_string(), "did not meet minimum".to_string())]);

    let hash = "49c0d2aef0ab2634b0051544cdbf2415";
    assert!(node.is_valid(&json!([hash, hash])));
    assert_eq!(
        pairs(&node, json!([hash, hash, hash])),
        vec![("".to_string(), "exceeds maximum".to_string())]
    );
}

#[test]
fn test_array_not_a_list() {
    let node = compile(json!({"__array__": "unique", "__type__": "int"}));
    let failures = unwrap_failure(node.valid(&json!({"a": 1}), &JsonPath::from_field("ids")));
    assert_eq!(failures.first().reason, "not a list");
    assert_eq!(failures.first().got.as_deref(), Some("object"));

    assert_eq!(
        node.clean(&json!("1,2")).unwrap_err(),
        CleanError::WrongShape {
            path: JsonPath::root(),
            expected: "list".to_string(),
            got: "string".to_string(),
        }
    );
}

#[test]
fn test_array_clean_maps_elements() {
    let node = compile(json!({"__array__": "duplicates", "__type__": "price"}));
    assert_eq!(node.clean(&json!([1, "2.5", 3.456])).unwrap(), json!(["1.00", "2.50", "3.46"]));

    let err = node.clean(&json!([1, "x"])).unwrap_err();
    assert_eq!(err.path().to_string(), "[1]");
}

#[test]
fn test_optional_array() {
    let node = compile(json!({"__array__": {"type": "unique", "optional": true}, "__type__": "int"}));
    assert!(node.is_optional());
    assert!(node.is_valid(&Value::Null));
    assert_eq!(node.clean(&Value::Null).unwrap(), Value::Null);
}

#[test]
fn test_hash_keys_and_values() {
    let node = compile(json!({
        "__hash__": {"__type__": "string", "__regex__": "^[a-z]{2}$"},
        "__type__": "price"
    }));
    let hash = node.as_hash().unwrap();
    assert_eq!(hash.key().regex(), Some("^[a-z]{2}$"));

    assert!(node.is_valid(&json!({"en": "1.50", "fr": 2})));
    assert_eq!(
        pairs(&node, json!({"eng": 1, "de": "x"})),
        vec![
            ("eng".to_string(), "invalid key: eng".to_string()),
            ("de".to_string(), "failed regex (internal)".to_string()),
        ]
    );
    assert_eq!(node.clean(&json!({"en": 1.5})).unwrap(), json!({"en": "1.50"}));
}

#[test]
fn test_hash_of_records() {
    let node = compile(json!({
        "__hash__": "uuid",
        "name": "string",
        "tags": {"__array__": "unique", "__type__": "string", "__optional__": true}
    }));
    let id = "52cd4b20-ca32-4433-9516-0c8684ec57c2";
    assert!(node.is_valid(&json!({id: {"name": "x"}})));
    assert_eq!(
        pairs(&node, json!({id: {"name": "x", "tags": ["a", "a"]}})),
        vec![(format!("{}.tags[1]", id), "duplicate of {}.tags[0]".replace("{}", id))]
    );
}

#[test]
fn test_options_dispatch() {
    let node = compile(json!([
        {"__type__": "uint"},
        {"__type__": "string", "__options__": ["hello", "there"]}
    ]));
    assert_eq!(node.clean(&json!("hello")).unwrap(), json!("hello"));
    assert_eq!(node.clean(&json!("1")).unwrap(), json!(1));
    assert_eq!(
        pairs(&node, json!("else")),
        vec![("".to_string(), "no valid option".to_string())]
    );
}

#[test]
fn test_options_of_records() {
    let node = compile(json!([
        {"kind": {"__type__": "string", "__options__": ["card"]}, "number": "string"},
        {"kind": {"__type__": "string", "__options__": ["iban"]}, "iban": "string"}
    ]));
    assert_eq!(node.as_options().map(|o| o.len()), Some(2));

    assert!(node.is_valid(&json!({"kind": "card", "number": "4111"})));
    assert!(node.is_valid(&json!({"kind": "iban", "iban": "DE00"})));
    assert!(!node.is_valid(&json!({"kind": "card", "iban": "DE00"})));
    assert_eq!(
        node.clean(&json!({"iban": "DE00", "kind": "iban"})).unwrap().to_string(),
        r#"{"kind":"iban","iban":"DE00"}"#
    );
}
