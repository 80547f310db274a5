//! Property-based tests over the two formatting presets
//!
//! Every value written with a descriptor must read back equal through the
//! same descriptor, whichever layout produced the text.

use json_descriptor::{
    field, from_str, to_string_with_options, Descriptor, FormatOptions, Host,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// True when no whitespace appears outside string bodies.
fn is_compact(text: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for ch in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch.is_whitespace() {
            return false;
        }
    }
    true
}

fn roundtrip<T: Host + Default + PartialEq + Debug>(value: &T, desc: &Descriptor) -> bool {
    [FormatOptions::dense(), FormatOptions::pretty()]
        .into_iter()
        .all(|options| {
            let dense = options.dense;
            let text = to_string_with_options(value, desc, options);
            if dense && !is_compact(&text) {
                eprintln!("Dense output has whitespace: {}", text);
                return false;
            }
            match from_str::<T>(&text, desc) {
                Ok(back) => *value == back,
                Err(e) => {
                    eprintln!("Parse failed: {}", e);
                    eprintln!("Text was: {}", text);
                    false
                }
            }
        })
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Sample {
    id: u32,
    label: String,
    score: f64,
    tags: Vec<String>,
    parent: Option<i64>,
}

impl Host for Sample {}

fn sample() -> Descriptor {
    Descriptor::field_list(vec![
        field!(Sample, id, Descriptor::number()),
        field!(Sample, label, Descriptor::string()),
        field!(Sample, score, Descriptor::number()),
        field!(Sample, tags, Descriptor::array(Descriptor::string())),
        field!(
            Sample,
            parent,
            Descriptor::optional(Descriptor::number()).unwrap()
        ),
    ])
}

fn finite_f64() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::ZERO | prop::num::f64::SUBNORMAL
}

proptest! {
    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n, &Descriptor::number()));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n, &Descriptor::number()));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n, &Descriptor::number()));
    }

    #[test]
    fn prop_f64(x in finite_f64()) {
        prop_assert!(roundtrip(&x, &Descriptor::number()));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b, &Descriptor::boolean()));
    }

    #[test]
    fn prop_string(s in any::<String>()) {
        prop_assert!(roundtrip(&s, &Descriptor::string()));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v, &Descriptor::array(Descriptor::number())));
    }

    #[test]
    fn prop_nested_vec(v in prop::collection::vec(prop::collection::vec(any::<bool>(), 0..5), 0..5)) {
        let desc = Descriptor::array(Descriptor::array(Descriptor::boolean()));
        prop_assert!(roundtrip(&v, &desc));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        let desc = Descriptor::optional(Descriptor::number()).unwrap();
        prop_assert!(roundtrip(&opt, &desc));
    }

    #[test]
    fn prop_string_map(m in prop::collection::btree_map(any::<String>(), any::<i16>(), 0..10)) {
        prop_assert!(roundtrip(&m, &Descriptor::object(Descriptor::number())));
    }

    #[test]
    fn prop_record(
        id in any::<u32>(),
        label in any::<String>(),
        score in finite_f64(),
        tags in prop::collection::vec("[a-z]{0,8}", 0..6),
        parent in proptest::option::of(any::<i64>()),
    ) {
        let value = Sample { id, label, score, tags, parent };
        prop_assert!(roundtrip(&value, &sample()));
    }

    #[test]
    fn prop_dense_has_no_whitespace(
        id in any::<u32>(),
        label in "[a-z]{0,8}",
        tags in prop::collection::vec("[a-z]{0,8}", 0..6),
        parent in proptest::option::of(any::<i64>()),
    ) {
        let value = Sample { id, label, score: 1.5, tags, parent };
        let text = to_string_with_options(&value, &sample(), FormatOptions::dense());
        prop_assert!(!text.contains(' ') && !text.contains('\n'), "{}", text);
        prop_assert!(is_compact(&text));
    }

    #[test]
    fn prop_tuple_element_list(t in (any::<i32>(), any::<bool>())) {
        let desc = Descriptor::element_list(vec![
            json_descriptor::element!((i32, bool), 0, Descriptor::number()),
            json_descriptor::element!((i32, bool), 1, Descriptor::boolean()),
        ]);
        prop_assert!(roundtrip(&t, &desc));
    }

    #[test]
    fn prop_truncated_input_never_panics(v in prop::collection::vec(any::<i32>(), 1..10), cut in 0usize..64) {
        let desc = Descriptor::array(Descriptor::number());
        let text = to_string_with_options(&v, &desc, FormatOptions::pretty());
        let end = cut.min(text.len().saturating_sub(1));
        prop_assert!(from_str::<Vec<i32>>(&text[..end], &desc).is_err());
    }
}

#[test]
fn test_map_roundtrip_keeps_keys() {
    let mut m = BTreeMap::new();
    m.insert("\u{1F600}".to_string(), 1i16);
    m.insert("tab\there".to_string(), -2);
    assert!(roundtrip(&m, &Descriptor::object(Descriptor::number())));
}
