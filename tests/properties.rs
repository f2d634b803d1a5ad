//! Property tests over generated documents.

use proptest::prelude::*;

use reprcheck::codec::collate::Collator;
use reprcheck::codec::Codec;
use reprcheck::conformance::{validate, verify_binary, verify_value};
use reprcheck::document::{to_text, Document, Number};
use reprcheck::{CodecFactory, Config, ContainerEncoding, NumberKind, ReferenceCodecFactory};

const ATOMS: &[&str] = &["a", "b", "key", " ", "0", "a-b", "~", "/", "\"", "\\", "\n", "\u{0}", "\u{e9}", "\u{2028}"];

fn string() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(ATOMS), 0..4).prop_map(|parts| parts.concat())
}

fn scalar() -> impl Strategy<Value = Document> {
    prop_oneof![
        Just(Document::Null),
        any::<bool>().prop_map(Document::Bool),
        (-1_000_000_000_000i64..1_000_000_000_000).prop_map(|i| Document::Number(Number::Int(i))),
        (-1.0e6f64..1.0e6).prop_map(|f| Document::Number(Number::Float(f))),
        string().prop_map(Document::String),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    scalar().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Document::Array),
            prop::collection::vec((string(), inner), 0..5).prop_map(|members| {
                let mut obj = Document::Object(Vec::new());
                for (key, value) in members {
                    if obj.get(&key).is_none() {
                        obj.insert(key, value);
                    }
                }
                obj
            }),
        ]
    })
}

fn smart() -> Config {
    Config::default().with_number_kind(NumberKind::IntPreferring)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_chain_closes(doc in document()) {
        let text = to_text(&doc);
        for nk in NumberKind::ALL {
            for ct in ContainerEncoding::ALL {
                let config = Config::default().with_number_kind(nk).with_container_encoding(ct);
                let codec = ReferenceCodecFactory.build(&config);
                let outcome = validate(&codec, text.as_bytes()).unwrap();
                prop_assert!(
                    outcome.all_passed(),
                    "{} {}: {:?}",
                    config,
                    text,
                    outcome.failures().collect::<Vec<_>>()
                );
            }
        }
    }

    #[test]
    fn reconstruction_reproduces_source(doc in document()) {
        let codec = ReferenceCodecFactory.build(&smart());
        prop_assert!(verify_value(&codec, &doc).is_ok());
        prop_assert!(verify_binary(&ReferenceCodecFactory, &smart(), &doc).is_ok());
    }

    #[test]
    fn byte_order_matches_comparator(a in document(), b in document(), prefixes in any::<(bool, bool)>()) {
        let config = smart()
            .with_array_length_prefix(prefixes.0)
            .with_property_count_prefix(prefixes.1);
        let codec = ReferenceCodecFactory.build(&config);
        let collator = Collator::new(&config);
        let by_value = codec.compare(&a, &b);
        let by_bytes = codec.value_to_ordered(&a).unwrap().cmp(&codec.value_to_ordered(&b).unwrap());
        prop_assert_eq!(by_value, by_bytes);
        prop_assert_eq!(collator.compare(&b, &a), by_value.reverse());
    }
}
