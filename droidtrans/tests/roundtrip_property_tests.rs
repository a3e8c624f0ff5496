use droidtrans::formats::Sheet;
use droidtrans::types::{Content, Quantity, ResourceRecord, ResourceSet};
use droidtrans::{WriteOptions, merge_translations};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::str::FromStr;

fn name_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("valid name regex")
}

fn value_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        proptest::string::string_regex("[A-Za-z0-9 _\\-\\.,!\\?%$]{0,30}")
            .expect("valid value regex"),
    )
}

fn quantity_strategy() -> impl Strategy<Value = Quantity> {
    prop_oneof![
        Just(Quantity::Zero),
        Just(Quantity::One),
        Just(Quantity::Two),
        Just(Quantity::Few),
        Just(Quantity::Many),
        Just(Quantity::Other),
        proptest::string::string_regex("[a-z]{1,6}")
            .expect("valid quantity regex")
            .prop_map(|key| key.parse::<Quantity>().expect("non-empty key")),
    ]
}

fn content_strategy() -> impl Strategy<Value = Content> {
    prop_oneof![
        value_strategy().prop_map(Content::Scalar),
        prop::collection::vec(value_strategy(), 0..5).prop_map(Content::List),
        prop::collection::btree_map(quantity_strategy(), value_strategy(), 0..5)
            .prop_map(|values: BTreeMap<Quantity, Option<String>>| Content::QuantityMap(values)),
    ]
}

fn record_strategy() -> impl Strategy<Value = ResourceRecord> {
    (name_strategy(), content_strategy(), any::<bool>(), any::<bool>()).prop_map(
        |(name, content, is_translatable, has_format_specifiers)| {
            ResourceRecord::new(name, content)
                .expect("non-empty name")
                .with_translatable(is_translatable)
                .with_format_specifiers(has_format_specifiers)
        },
    )
}

fn pair_strategy() -> impl Strategy<Value = BTreeMap<String, (Content, Content)>> {
    prop::collection::btree_map(
        name_strategy(),
        (content_strategy(), content_strategy()),
        1..8,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn serialize_self_roundtrip_preserves_record(record in record_strategy()) {
        let encoded = record.serialize_self().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(!encoded.contains('\n'));

        let decoded = ResourceRecord::deserialize_self(&encoded)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&decoded, &record);
        prop_assert_eq!(decoded.is_translatable, record.is_translatable);
        prop_assert_eq!(decoded.has_format_specifiers, record.has_format_specifiers);
        prop_assert!(!decoded.is_final());
    }

    #[test]
    fn written_targets_keep_content_and_final_status(pairs in pair_strategy(), finals in any::<u8>()) {
        let mut target = ResourceSet::new("de", false).expect("language");
        for (i, (name, (source_content, target_content))) in pairs.iter().enumerate() {
            let mut record = ResourceRecord::new(name.as_str(), target_content.clone()).expect("name");
            if finals & (1 << (i % 8)) != 0 {
                record = record.with_source_snapshot(
                    ResourceRecord::new(name.as_str(), source_content.clone()).expect("name"),
                );
            }
            target.insert(record).expect("unique names");
        }

        let mut out = Vec::new();
        target
            .write_file("strings.xml", &mut out, &WriteOptions::default())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let xml = String::from_utf8(out).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let mut reread = ResourceSet::new("de", false).expect("language");
        reread
            .parse_str("strings.xml", &xml)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        for record in &target {
            match reread.get(record.name()) {
                Some(back) => {
                    prop_assert_eq!(back, record);
                    prop_assert_eq!(back.source_snapshot(), record.source_snapshot());
                }
                None => prop_assert!(!record.requires_translation()),
            }
        }
    }

    #[test]
    fn merge_with_itself_is_stable(pairs in pair_strategy()) {
        let mut source = ResourceSet::new("en", true).expect("language");
        let mut target = ResourceSet::new("de", false).expect("language");
        for (name, (source_content, target_content)) in &pairs {
            let source_record = ResourceRecord::new(name.as_str(), source_content.clone()).expect("name");
            let target_record = ResourceRecord::new(name.as_str(), target_content.clone())
                .expect("name")
                .with_source_snapshot(source_record.clone());
            source.insert(source_record).expect("unique names");
            target.insert(target_record).expect("unique names");
        }

        let first = merge_translations(&source, &target, Some(&target));
        let second = merge_translations(&source, &first.merged, Some(&first.merged));
        prop_assert_eq!(first.merged.len(), second.merged.len());
        for record in &first.merged {
            let again = second.merged.get(record.name());
            prop_assert_eq!(again, Some(record));
            prop_assert_eq!(again.map(ResourceRecord::is_final), Some(record.is_final()));
        }
        prop_assert_eq!(second.report.extra_targets, 0);
    }

    #[test]
    fn exported_sheet_survives_csv(pairs in pair_strategy()) {
        let mut source = ResourceSet::new("en", true).expect("language");
        for (name, (source_content, _)) in &pairs {
            source
                .insert(ResourceRecord::new(name.as_str(), source_content.clone()).expect("name"))
                .expect("unique names");
        }
        let target = ResourceSet::new("de", false).expect("language");

        let sheet = Sheet::export(&source, &target);
        let mut out = Vec::new();
        sheet.to_writer(&mut out).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let text = String::from_utf8(out).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let back = Sheet::from_str(&text).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(back.rows.len(), sheet.rows.len());
        for (a, b) in back.rows.iter().zip(&sheet.rows) {
            prop_assert_eq!(&a.name, &b.name);
            prop_assert_eq!(&a.index, &b.index);
            // an empty cell reads back as no value
            prop_assert_eq!(
                a.source.as_deref().unwrap_or_default(),
                b.source.as_deref().unwrap_or_default()
            );
        }
    }
}
