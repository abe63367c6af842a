//! Property-based round-trip guarantees across generated inputs.

use proptest::prelude::*;

use cfgish::{dump_string, parse_string, FormatOptions, Value};

fn lenient_json() -> FormatOptions {
    // JSON layout, but allow the special floats so any f64 can be written.
    FormatOptions {
        inf: true,
        nan: true,
        ..FormatOptions::json()
    }
}

fn roundtrip(value: &Value, options: &FormatOptions) -> Value {
    let text = dump_string(value, options).expect("dump failed");
    parse_string(&text, options, "prop").expect("reparse failed")
}

proptest! {
    #[test]
    fn prop_i64_roundtrip(n in any::<i64>()) {
        let back = roundtrip(&Value::from(n), &FormatOptions::json());
        prop_assert_eq!(back.as_int().unwrap(), n);
    }

    #[test]
    fn prop_f64_roundtrip_bit_exact(n in any::<f64>()) {
        let back = roundtrip(&Value::from(n), &lenient_json());
        let parsed = back.as_float().unwrap();
        if n.is_nan() {
            prop_assert!(parsed.is_nan());
        } else {
            prop_assert_eq!(parsed.to_bits(), n.to_bits());
        }
    }

    #[test]
    fn prop_string_roundtrip(s in any::<String>()) {
        let back = roundtrip(&Value::from(s.clone()), &FormatOptions::json());
        prop_assert_eq!(back.as_str().unwrap(), s);
    }

    #[test]
    fn prop_int_array_roundtrip(v in prop::collection::vec(any::<i64>(), 0..32)) {
        let value = Value::from(v.clone());
        let back = roundtrip(&value, &FormatOptions::json());
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_object_roundtrip(
        entries in prop::collection::vec(("[a-z_][a-z0-9_]{0,10}", any::<i64>()), 1..16)
    ) {
        let mut value = Value::object();
        for (key, n) in &entries {
            value.insert_or_assign(key, Value::from(*n)).unwrap();
        }
        let json_back = roundtrip(&value, &FormatOptions::json());
        prop_assert_eq!(&json_back, &value);

        // The CFG dialect writes identifier keys bare; they must reparse,
        // including keys that collide with keywords.
        let cfg_back = roundtrip(&value, &FormatOptions::cfg());
        prop_assert_eq!(&cfg_back, &value);
    }

    #[test]
    fn prop_compact_roundtrip(v in prop::collection::vec(any::<i32>(), 0..16)) {
        let compact = FormatOptions {
            indentation: String::new(),
            ..FormatOptions::json()
        };
        let value = Value::from(v);
        let back = roundtrip(&value, &compact);
        prop_assert_eq!(back, value);
    }
}
