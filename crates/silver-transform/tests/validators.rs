//! Behaviour of the typed field validators.

use silver_model::IssueKind;
use silver_transform::Validated;
use silver_transform::normalization::{
    binary_flag, composite_pair, fixed_precision, normalize_timestamp, plain_number,
    range_integer, sentinel_integer, strict_integer,
};

#[test]
fn range_integer_accepts_integral_text() {
    assert_eq!(range_integer("2", 0, 4), Validated::Valid(2));
    assert_eq!(range_integer("2.0", 0, 4), Validated::Valid(2));
    assert_eq!(range_integer("4", 0, 4), Validated::Valid(4));
}

#[test]
fn range_integer_rejects_with_diagnostic() {
    assert_eq!(
        range_integer("7", 0, 4),
        Validated::Invalid(IssueKind::OutOfRange {
            value: 7,
            min: 0,
            max: 4
        })
    );
    assert_eq!(
        range_integer("abc", 0, 4),
        Validated::Invalid(IssueKind::InvalidNumber)
    );
}

#[test]
fn range_integer_empty_is_silent() {
    assert_eq!(range_integer("", 0, 4), Validated::Missing);
}

#[test]
fn binary_flag_is_zero_or_one() {
    assert_eq!(binary_flag("1"), Validated::Valid(1));
    assert_eq!(binary_flag("0.0"), Validated::Valid(0));
    assert!(binary_flag("2").is_invalid());
}

#[test]
fn sentinel_maps_to_missing() {
    assert_eq!(sentinel_integer("65535", 65535), Validated::Missing);
    assert_eq!(sentinel_integer("120", 65535), Validated::Valid(120));
    assert_eq!(sentinel_integer("", 65535), Validated::Missing);
    assert!(sentinel_integer("n/a", 65535).is_invalid());
}

#[test]
fn plain_number_truncates() {
    assert_eq!(plain_number("93.7"), Validated::Valid(93));
    assert_eq!(plain_number(""), Validated::Missing);
    assert!(plain_number("hot").is_invalid());
}

#[test]
fn strict_integer_refuses_decimals() {
    assert_eq!(strict_integer("17"), Validated::Valid(17));
    assert_eq!(strict_integer("-3"), Validated::Valid(-3));
    assert_eq!(
        strict_integer("2.0"),
        Validated::Invalid(IssueKind::InvalidInteger)
    );
}

#[test]
fn fixed_precision_rounds() {
    assert_eq!(fixed_precision("3.14159"), Validated::Valid(3.14));
    assert_eq!(fixed_precision(""), Validated::Missing);
}

#[test]
fn composite_pair_contract() {
    assert_eq!(composite_pair("12;34"), Validated::Valid((12, 34)));
    assert_eq!(composite_pair(" 12 ; 34.9 "), Validated::Valid((12, 34)));
    assert_eq!(
        composite_pair("12"),
        Validated::Invalid(IssueKind::PairArity { parts: 1 })
    );
    assert_eq!(
        composite_pair("12;34;56"),
        Validated::Invalid(IssueKind::PairArity { parts: 3 })
    );
    assert_eq!(
        composite_pair("12;x"),
        Validated::Invalid(IssueKind::PairPart)
    );
    assert_eq!(composite_pair(""), Validated::Missing);
    assert_eq!(composite_pair("12").value(), None);
}

#[test]
fn timestamps_normalize_to_canonical_layout() {
    let expected = Validated::Valid("2024-03-15 10:00:00".to_string());
    assert_eq!(normalize_timestamp("03/15/2024 10:00:00"), expected);
    assert_eq!(normalize_timestamp("2024-03-15 10:00:00"), expected);
    assert_eq!(
        normalize_timestamp("3/5/2024 7:08:09"),
        Validated::Valid("2024-03-05 07:08:09".to_string())
    );
}

#[test]
fn timestamps_reject_other_layouts() {
    assert_eq!(
        normalize_timestamp("15.03.2024 10:00"),
        Validated::Invalid(IssueKind::InvalidDatetime)
    );
    assert_eq!(
        normalize_timestamp("2024-02-30 10:00:00"),
        Validated::Invalid(IssueKind::InvalidDatetime)
    );
    assert_eq!(normalize_timestamp(""), Validated::Missing);
}
