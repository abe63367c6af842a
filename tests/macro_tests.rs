use cfgish::{cfgish, dump_string, FormatOptions, Kind, ObjectMap, Value};

#[test]
fn test_null() {
    assert!(cfgish!(null).is_null());
}

#[test]
fn test_booleans() {
    assert_eq!(cfgish!(true), Value::from(true));
    assert_eq!(cfgish!(false), Value::from(false));
}

#[test]
fn test_numbers_and_strings() {
    assert_eq!(cfgish!(42), Value::from(42));
    assert_eq!(cfgish!(-7), Value::from(-7));
    assert_eq!(cfgish!(2.5), Value::from(2.5));
    assert_eq!(cfgish!("text"), Value::from("text"));
}

#[test]
fn test_arrays() {
    assert_eq!(cfgish!([]).kind(), Kind::Array);
    assert_eq!(cfgish!([]).array_len().unwrap(), 0);

    let array = cfgish!([1, "two", null, true]);
    assert_eq!(array.array_len().unwrap(), 4);
    assert_eq!(array.at(1).unwrap(), &Value::from("two"));
    assert!(array.at(2).unwrap().is_null());
}

#[test]
fn test_objects() {
    assert_eq!(cfgish!({}), Value::object());

    let cfg = cfgish!({
        "name": "Alice",
        "age": 30,
    });
    assert_eq!(cfg.object_len().unwrap(), 2);
    assert_eq!(cfg.get("name").unwrap().as_str().unwrap(), "Alice");
    assert_eq!(cfg.get("age").unwrap().as_int().unwrap(), 30);
}

#[test]
fn test_nested_literals() {
    let cfg = cfgish!({
        "window": {
            "size": [800, 600],
            "fullscreen": false
        },
        "volumes": [0.5, 0.75, 1.0]
    });

    assert_eq!(cfg.get_or_path(&["window", "fullscreen"], true).unwrap(), false);
    assert_eq!(cfg.get("volumes").unwrap().at(2).unwrap(), &Value::from(1.0));
}

#[test]
fn test_macro_tree_dumps_like_parsed_tree() {
    let built = cfgish!({ "a": 1, "b": [true, null] });
    let options = FormatOptions::json();
    let text = dump_string(&built, &options).unwrap();
    let parsed = cfgish::parse_string(&text, &options, "macro.json").unwrap();
    assert_eq!(built, parsed);
}

#[test]
fn test_object_map_from_iter() {
    let map: ObjectMap = vec![
        ("one".to_string(), Value::from(1)),
        ("two".to_string(), Value::from(2)),
    ]
    .into_iter()
    .collect();
    let value = Value::from(map);
    assert_eq!(value.get("two").unwrap().as_int().unwrap(), 2);
}
