//! End-to-end flows: building and mutating trees, typed access, the
//! dangling-key audit, include resolution, and serde interop.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use cfgish::{
    cfgish, dump_string, dump_string_with, parse_string, Error, FormatOptions, ParseSession, Value,
};

#[test]
fn test_build_and_dump() {
    let mut cfg = Value::object();
    cfg.insert_or_assign("pi", Value::from(3.141)).unwrap();
    cfg.insert_or_assign("happy", Value::from(true)).unwrap();
    cfg.insert_or_assign("name", Value::from("Emil")).unwrap();
    cfg.insert_or_assign("nothing", Value::null()).unwrap();

    let mut answer = Value::object();
    answer.insert_or_assign("everything", Value::from(42)).unwrap();
    cfg.insert_or_assign("answer", answer).unwrap();
    cfg.insert_or_assign("array", Value::from(vec![1, 0, 2])).unwrap();

    let json = dump_string(&cfg, &FormatOptions::json()).unwrap();
    let back = parse_string(&json, &FormatOptions::json(), "built.json").unwrap();
    assert_eq!(cfg, back);
    assert_eq!(back.get("name").unwrap().as_str().unwrap(), "Emil");
    assert_eq!(
        back.get("answer").unwrap().get("everything").unwrap().as_int().unwrap(),
        42
    );
}

#[test]
fn test_index_sugar() {
    let mut cfg = Value::object();
    cfg["pi"] = Value::from(3.141);
    cfg["array"] = Value::from(vec![10, 20, 30]);

    assert_eq!(cfg["pi"].as_float().unwrap(), 3.141);
    assert_eq!(cfg["array"][1].as_int().unwrap(), 20);

    cfg["array"][1] = Value::from(99);
    assert_eq!(cfg["array"][1].as_int().unwrap(), 99);
}

#[test]
#[should_panic(expected = "Key 'missing' not in object")]
fn test_index_missing_key_panics() {
    let cfg = Value::object();
    let _ = &cfg["missing"];
}

#[test]
fn test_typed_access_failures() {
    let cfg = parse_string(
        "{\"pi\": 3.14, \"array\": [1, 2], \"obj\": {}}",
        &FormatOptions::json(),
        "config.json",
    )
    .unwrap();

    // Widening int-to-float is fine, narrowing float-to-bool is not.
    assert_eq!(cfg.get("pi").unwrap().as_float().unwrap(), 3.14);
    let err = cfg.get("pi").unwrap().as_bool().unwrap_err();
    assert!(err.to_string().contains("config.json:1"));
    assert!(err.to_string().contains("Expected bool, got float"));

    // Missing key cites the object's location.
    let err = cfg.get("obj").unwrap().get("does_not_exist").unwrap_err();
    assert!(err.to_string().contains("Key 'does_not_exist' not in object"));

    // Indexing a non-array.
    assert!(cfg.get("pi").unwrap().at(5).is_err());

    // Out of bounds.
    let err = cfg.get("array").unwrap().at(5).unwrap_err();
    assert!(err.to_string().contains("Array index out of range"));

    // Mutating a non-container.
    let mut uninit = Value::default();
    assert!(uninit.push(Value::from(1)).is_err());
    assert!(uninit.insert_or_assign("k", Value::from(1)).is_err());
}

#[test]
fn test_dangling_detection() {
    let cfg = parse_string(
        "{\"used\": 1, \"unused\": 2}",
        &FormatOptions::json(),
        "app.json",
    )
    .unwrap();
    cfg.get("used").unwrap();

    let err = cfg.check_dangling().unwrap_err();
    match &err {
        Error::DanglingKeys(keys) => {
            assert_eq!(keys.len(), 1);
            assert_eq!(keys[0].key, "unused");
            assert_eq!(keys[0].location, "app.json:1: ");
        }
        other => panic!("expected DanglingKeys, got {:?}", other),
    }
    assert!(err.to_string().contains("Key 'unused' never accessed."));
}

#[test]
fn test_iteration_marks_accessed() {
    let cfg = parse_string(
        "{\"a\": 1, \"b\": 2}",
        &FormatOptions::json(),
        "iter.json",
    )
    .unwrap();

    for (_key, value) in cfg.as_object().unwrap().iter() {
        value.as_int().unwrap();
    }
    assert!(cfg.check_dangling().is_ok());
}

#[test]
fn test_read_does_not_create_entries() {
    let cfg = parse_string("{\"a\": 1}", &FormatOptions::json(), "ro.json").unwrap();
    assert!(cfg.get("missing").is_err());
    assert_eq!(cfg.object_len().unwrap(), 1);
}

#[test]
fn test_get_or_chains() {
    let cfg = parse_string(
        "{\"window\": {\"width\": 800}}",
        &FormatOptions::json(),
        "app.json",
    )
    .unwrap();

    assert_eq!(cfg.get_or_path(&["window", "width"], 0i64).unwrap(), 800);
    assert_eq!(cfg.get_or_path(&["window", "height"], 600i64).unwrap(), 600);
    assert_eq!(
        cfg.get_or_path(&["viewport", "width"], 1024i64).unwrap(),
        1024
    );
    assert_eq!(
        cfg.get("window").unwrap().get_or("title", "untitled".to_string()).unwrap(),
        "untitled"
    );
}

#[test]
fn test_include_dedup_and_includers() {
    let mut files = HashMap::new();
    files.insert("shared.cfg".to_string(), "42".to_string());
    let mut session = ParseSession::new(move |path: &str| {
        files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("{} does not exist", path))
    });

    let cfg = session
        .parse(
            "x: #include \"shared.cfg\"\ny: #include \"shared.cfg\"\n",
            &FormatOptions::cfg(),
            "main.cfg",
        )
        .unwrap();

    let x = cfg.get("x").unwrap();
    let y = cfg.get("y").unwrap();
    assert_eq!(x.as_int().unwrap(), 42);
    assert_eq!(x, y);

    // Both directive sites are recorded on the shared document.
    let doc = x.doc().unwrap();
    assert_eq!(doc.filename(), "shared.cfg");
    let includers = doc.includers();
    assert_eq!(includers.len(), 2);
    assert_eq!(includers[0].doc.filename(), "main.cfg");
    assert_eq!(includers[0].line, 1);
    assert_eq!(includers[1].line, 2);
}

#[test]
fn test_include_error_reports_chain() {
    let mut session = ParseSession::new(|path: &str| {
        if path == "broken.cfg" {
            Ok("{ bad".to_string())
        } else {
            Err("unknown".to_string())
        }
    });
    let err = session
        .parse(
            "part: #include \"broken.cfg\"\n",
            &FormatOptions::cfg(),
            "main.cfg",
        )
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("broken.cfg:"));
    assert!(text.contains("included at"));
    assert!(text.contains("main.cfg:1"));
}

#[test]
fn test_include_loader_failure_is_io_error() {
    let mut session = ParseSession::new(|_: &str| Err("disk on fire".to_string()));
    let err = session
        .parse("#include \"gone.cfg\"", &FormatOptions::cfg(), "main.cfg")
        .unwrap_err();
    match err {
        Error::Io { path, message } => {
            assert_eq!(path, "gone.cfg");
            assert_eq!(message, "disk on fire");
        }
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn test_include_emission_through_sink() {
    let mut files = HashMap::new();
    files.insert("colors.cfg".to_string(), "[1 2 3]".to_string());
    let mut session = ParseSession::new(move |path: &str| {
        files.get(path).cloned().ok_or_else(|| "missing".to_string())
    });
    let cfg = session
        .parse(
            "palette: #include \"colors.cfg\"\n",
            &FormatOptions::cfg(),
            "main.cfg",
        )
        .unwrap();

    let mut written: Vec<(String, String)> = Vec::new();
    let text = dump_string_with(&cfg, &FormatOptions::cfg(), &mut |path: &str, body: &str| {
        written.push((path.to_string(), body.to_string()));
        Ok(())
    })
    .unwrap();

    assert!(text.contains("palette: #include <colors.cfg>"));
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].0, "colors.cfg");
    assert!(written[0].1.contains("[ 1 2 3 ]"));

    // Without a sink the subtree is inlined instead.
    let inlined = dump_string(&cfg, &FormatOptions::cfg()).unwrap();
    assert!(inlined.contains("[ 1 2 3 ]"));
    assert!(!inlined.contains("#include"));
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Server {
    host: String,
    port: u16,
    tls: bool,
}

#[test]
fn test_serde_round_trip_via_json() {
    let server = Server {
        host: "localhost".to_string(),
        port: 8080,
        tls: false,
    };

    // Struct -> serde_json::Value -> cfgish::Value -> document text.
    let as_json = serde_json::to_value(&server).unwrap();
    let value: Value = serde_json::from_value(as_json).unwrap();
    let text = dump_string(&value, &FormatOptions::cfg()).unwrap();
    assert!(text.contains("host:"));

    // And back down to the struct through the document syntax.
    let reparsed = parse_string(&text, &FormatOptions::cfg(), "server.cfg").unwrap();
    let server_back: Server =
        serde_json::from_value(serde_json::to_value(&reparsed).unwrap()).unwrap();
    assert_eq!(server, server_back);
}

#[test]
fn test_line_provenance() {
    let cfg = parse_string(
        "{\n\t\"first\": 1,\n\t\"second\": {\n\t\t\"third\": 3\n\t}\n}",
        &FormatOptions::json(),
        "lines.json",
    )
    .unwrap();
    assert_eq!(cfg.get("first").unwrap().line(), Some(2));
    assert_eq!(cfg.get("second").unwrap().line(), Some(3));
    assert_eq!(
        cfg.get("second").unwrap().get("third").unwrap().line(),
        Some(4)
    );
    assert_eq!(
        cfg.get("first").unwrap().location(),
        "lines.json:2: "
    );
}

#[test]
fn test_mutation_operations() {
    let mut cfg = cfgish!({ "keep": 1, "drop": 2 });

    assert!(cfg.remove("drop").unwrap());
    assert!(!cfg.remove("drop").unwrap());
    assert_eq!(cfg.object_len().unwrap(), 1);

    assert!(cfg.emplace("fresh", Value::from(3)).unwrap());
    assert!(!cfg.emplace("fresh", Value::from(4)).unwrap());
    assert_eq!(cfg.get("fresh").unwrap().as_int().unwrap(), 3);

    cfg.get_mut("list").unwrap().assign(Value::array());
    cfg.get_mut("list").unwrap().push(Value::from("a")).unwrap();
    assert_eq!(cfg.get("list").unwrap().array_len().unwrap(), 1);
}
