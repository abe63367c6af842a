//! Round-trip guarantees: text → tree → text is the identity on accepted
//! documents, and numbers reparse to the exact same bits.

use cfgish::{dump_string, parse_string, FormatOptions, Value};

fn dump_trimmed(value: &Value, options: &FormatOptions) -> String {
    let mut text = dump_string(value, options).unwrap();
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

#[test]
fn test_numeric_text_is_byte_identical() {
    let options = FormatOptions::json();
    for text in [
        "42",
        "-42",
        "9223372036854775807",
        "-9223372036854775808",
        "0.0",
        "-0.0",
        "1.0",
        "-1.0",
        "5e-324",
        "2.225073858507201e-308",
        "2.2250738585072014e-308",
        "1.7976931348623157e+308",
        "3.14",
    ] {
        let value = parse_string(text, &options, "roundtrip").unwrap();
        assert_eq!(dump_trimmed(&value, &options), text);
    }
}

#[test]
fn test_double_parsing() {
    let cases: &[(&str, f64)] = &[
        ("0.0", 0.0),
        ("-0.0", -0.0),
        ("1.5", 1.5),
        ("-1.5", -1.5),
        ("3.1416", 3.1416),
        ("1E10", 1E10),
        ("1e10", 1e10),
        ("1E+10", 1E+10),
        ("1E-10", 1E-10),
        ("-1E10", -1E10),
        ("1.234E+10", 1.234E+10),
        ("1.234E-10", 1.234E-10),
        ("1.79769e+308", 1.79769e+308),
        ("2.22507e-308", 2.22507e-308),
        // Minimum denormal.
        ("4.9406564584124654e-324", 4.9406564584124654e-324),
        // Max subnormal double.
        ("2.2250738585072009e-308", 2.2250738585072009e-308),
        // Min normal positive double.
        ("2.2250738585072014e-308", 2.2250738585072014e-308),
        // Max double.
        ("1.7976931348623157e+308", 1.7976931348623157e+308),
        // Must underflow.
        ("1e-10000", 0.0),
        // 2^64, forced to double.
        ("18446744073709551616", 18446744073709551616.0),
        // One below i64::MIN, forced to double.
        ("-9223372036854775809", -9223372036854775809.0),
        ("0.9868011474609375", 0.9868011474609375),
        ("123e34", 123e34),
        ("45913141877270640000.0", 45913141877270640000.0),
        // Normal/subnormal boundary rounding.
        ("2.2250738585072012e-308", 2.2250738585072014e-308),
        ("0.999999999999999944488848768742172978818416595458984375", 1.0),
        ("1.00000000000000011102230246251565404236316680908203125", 1.0),
        ("72057594037927928.0", 72057594037927928.0),
        ("72057594037927932.0", 72057594037927936.0),
    ];
    let options = FormatOptions::json();
    for (text, expected) in cases {
        let parsed = parse_string(text, &options, "doubles")
            .unwrap()
            .as_float()
            .unwrap();
        assert_eq!(
            parsed.to_bits(),
            expected.to_bits(),
            "parsing {:?}",
            text
        );
    }
}

#[test]
fn test_string_decoding() {
    let cases: &[(&str, &str)] = &[
        ("\"\"", ""),
        ("\"Hello\"", "Hello"),
        ("\"Hello\\nWorld\"", "Hello\nWorld"),
        ("\"\\\"\\\\/\\b\\f\\n\\r\\t\"", "\"\\/\u{8}\u{c}\n\r\t"),
        ("\"\\u0024\"", "$"),
        ("\"\\u00A2\"", "\u{a2}"),
        ("\"\\u20AC\"", "\u{20ac}"),
        ("\"\\uD834\\uDD1E\"", "\u{1d11e}"),
    ];
    let options = FormatOptions::json();
    for (text, expected) in cases {
        let parsed = parse_string(text, &options, "strings").unwrap();
        assert_eq!(parsed.as_str().unwrap(), *expected, "parsing {:?}", text);
    }
}

#[test]
fn test_nul_round_trips_as_unicode_escape() {
    let options = FormatOptions::json();
    let value = parse_string("\"a\\u0000b\"", &options, "nul").unwrap();
    assert_eq!(value.as_str().unwrap(), "a\u{0}b");
    assert_eq!(dump_trimmed(&value, &options), "\"a\\u0000b\"");
}

#[test]
fn test_structural_round_trip_json() {
    let options = FormatOptions::json();
    for text in [
        "{\"a\": 1, \"b\": [1, 2, 3], \"c\": {\"d\": null}}",
        "[true, false, null, 0.5, \"s\"]",
        "{\"empty_array\": [], \"empty_object\": {}}",
        "{\"zebra\": 1, \"apple\": 2, \"mango\": 3}",
    ] {
        let first = parse_string(text, &options, "rt.json").unwrap();
        let dumped = dump_string(&first, &options).unwrap();
        let second = parse_string(&dumped, &options, "rt.json").unwrap();
        assert_eq!(first, second, "round-tripping {:?}", text);
    }
}

#[test]
fn test_structural_round_trip_cfg() {
    let options = FormatOptions::cfg();
    for text in [
        "pi: 3.14\nlist: [1 2 3]\n",
        "obj: {\n\tinner: \"value\",\n}\n",
        "matrix: [1 0 0 1]\nflags: 0xff\n",
        "// header\na: 1 // trailing\n/* footer */\n",
    ] {
        let first = parse_string(text, &options, "rt.cfg").unwrap();
        let dumped = dump_string(&first, &options).unwrap();
        let second = parse_string(&dumped, &options, "rt.cfg").unwrap();
        assert_eq!(first, second, "round-tripping {:?}", text);
    }
}

#[test]
fn test_structural_round_trip_compact() {
    let compact = FormatOptions {
        indentation: String::new(),
        ..FormatOptions::json()
    };
    let source = parse_string(
        "{\"a\": [1, 2], \"b\": {\"c\": \"text\"}, \"d\": -0.0}",
        &FormatOptions::json(),
        "c.json",
    )
    .unwrap();
    let dumped = dump_string(&source, &compact).unwrap();
    let reparsed = parse_string(&dumped, &compact, "c.json").unwrap();
    assert_eq!(source, reparsed);
    // Compact twice is stable.
    assert_eq!(dump_string(&reparsed, &compact).unwrap(), dumped);
}

#[test]
fn test_insertion_order_survives_round_trip() {
    let options = FormatOptions::json();
    let value = parse_string(
        "{\"zebra\": 1, \"apple\": 2, \"mango\": 3}",
        &options,
        "order.json",
    )
    .unwrap();
    let dumped = dump_string(&value, &options).unwrap();
    let zebra = dumped.find("zebra").unwrap();
    let apple = dumped.find("apple").unwrap();
    let mango = dumped.find("mango").unwrap();
    assert!(zebra < apple && apple < mango);

    let sorted = FormatOptions {
        sort_keys: true,
        ..FormatOptions::json()
    };
    let dumped = dump_string(&value, &sorted).unwrap();
    let zebra = dumped.find("zebra").unwrap();
    let apple = dumped.find("apple").unwrap();
    let mango = dumped.find("mango").unwrap();
    assert!(apple < mango && mango < zebra);
}

#[test]
fn test_comment_positions_survive_round_trip() {
    let options = FormatOptions::cfg();
    let text = "{\n\t// leading\n\ta: 1, // trailing\n\t/* closing */\n}";
    let first = parse_string(text, &options, "comments.cfg").unwrap();

    let a = first.get("a").unwrap();
    assert_eq!(a.comments().prefix, vec!["// leading"]);
    assert_eq!(a.comments().postfix, vec!["// trailing"]);
    assert_eq!(first.comments().pre_end_brace, vec!["/* closing */"]);

    let dumped = dump_string(&first, &options).unwrap();
    let second = parse_string(&dumped, &options, "comments.cfg").unwrap();
    let a = second.get("a").unwrap();
    assert_eq!(a.comments().prefix, vec!["// leading"]);
    assert_eq!(a.comments().postfix, vec!["// trailing"]);
    assert_eq!(second.comments().pre_end_brace, vec!["/* closing */"]);
}

#[test]
fn test_float_round_trip_from_values() {
    let options = FormatOptions::json();
    for value in [
        0.1,
        1.0 / 3.0,
        2.0_f64.powi(-1022),
        f64::MIN_POSITIVE,
        f64::EPSILON,
        6.02214076e23,
        -1.6e-35,
    ] {
        let dumped = dump_string(&Value::from(value), &options).unwrap();
        let parsed = parse_string(&dumped, &options, "f.json")
            .unwrap()
            .as_float()
            .unwrap();
        assert_eq!(parsed.to_bits(), value.to_bits(), "round-tripping {}", value);
    }
}
