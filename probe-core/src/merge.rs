//! Merge engine: folds parser outputs into one field map.
//!
//! PartialRecords are applied in ascending precedence order. The generic
//! detector comes first and format-specific parsers after, so the more
//! accurate tool wins every field collision. Values never disappear
//! entirely: losing values remain in the per-tool sections of the record.

use crate::record::PartialRecord;

/// Merges partial records in ascending precedence order.
///
/// A later non-empty value overwrites an earlier one; empty values never
/// overwrite anything (PartialRecord refuses them at insertion, which also
/// makes this merge idempotent).
pub fn merge(partials: &[&PartialRecord]) -> PartialRecord {
    let mut merged = PartialRecord::new();
    for partial in partials {
        for (name, value) in partial.iter() {
            merged.set(name, value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{fields, FieldValue};

    fn rec(entries: &[(&str, FieldValue)]) -> PartialRecord {
        let mut r = PartialRecord::new();
        for (name, value) in entries {
            r.set(name, value.clone());
        }
        r
    }

    #[test]
    fn test_higher_precedence_wins() {
        let generic = rec(&[
            (fields::MIME_TYPE, FieldValue::Text("image/jpeg".into())),
            (fields::WIDTH, FieldValue::Integer(100)),
        ]);
        let specific = rec(&[(fields::WIDTH, FieldValue::Integer(1920))]);

        let merged = merge(&[&generic, &specific]);
        assert_eq!(merged.get(fields::WIDTH), Some(&FieldValue::Integer(1920)));
        // Non-conflicting fields from the lower-precedence record survive.
        assert_eq!(
            merged.get(fields::MIME_TYPE),
            Some(&FieldValue::Text("image/jpeg".into()))
        );
    }

    #[test]
    fn test_empty_never_overwrites() {
        let first = rec(&[(fields::FORMAT, FieldValue::Text("png".into()))]);
        let second = rec(&[(fields::CODEC_NAME, FieldValue::Text("h264".into()))]);

        // A record lacking the field leaves the earlier value in place, and
        // empty text can never be inserted in the first place.
        let merged = merge(&[&first, &second]);
        assert_eq!(
            merged.get(fields::FORMAT),
            Some(&FieldValue::Text("png".into()))
        );
        assert_eq!(
            merged.get(fields::CODEC_NAME),
            Some(&FieldValue::Text("h264".into()))
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = rec(&[
            (fields::WIDTH, FieldValue::Integer(640)),
            (fields::FORMAT, FieldValue::Text("gif".into())),
        ]);
        let b = rec(&[(fields::WIDTH, FieldValue::Integer(800))]);

        let once = merge(&[&a, &b]);
        let twice = merge(&[&once, &once]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_field_is_lost() {
        let a = rec(&[(fields::MIME_TYPE, FieldValue::Text("video/mp4".into()))]);
        let b = rec(&[(fields::DURATION_SECONDS, FieldValue::Float(12.5))]);
        let c = rec(&[(fields::PAGE_COUNT, FieldValue::Integer(3))]);

        let merged = merge(&[&a, &b, &c]);
        assert_eq!(merged.len(), 3);
        for source in [&a, &b, &c] {
            for (name, _) in source.iter() {
                assert!(merged.get(name).is_some(), "field {name} lost in merge");
            }
        }
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        assert!(merge(&[]).is_empty());
    }
}
