//! Property-based tests for server record validation.
//!
//! Uses proptest to verify:
//! 1. Coin amounts are accepted in number or text form and negatives are
//!    rejected.
//! 2. Multipliers are accepted exactly when positive.
//! 3. Arbitrary text never panics the date and record parsers.

#![allow(clippy::unwrap_used)]

use chrono::{Datelike, NaiveDate};
use coinquest_proto::Multiplier;
use coinquest_proto::record::{
    LooseInt, TodoRecord, WishRecord, decode_json_list, parse_due_date, parse_timestamp,
};
use coinquest_proto::{Task, Wish};
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    #[test]
    fn non_negative_amounts_accepted(n in 0i64..=i64::MAX) {
        let expected = n.unsigned_abs();
        prop_assert_eq!(LooseInt::Number(n).to_amount("coins").ok(), Some(expected));
        prop_assert_eq!(LooseInt::Text(n.to_string()).to_amount("coins").ok(), Some(expected));
    }

    #[test]
    fn negative_amounts_rejected(n in i64::MIN..0) {
        prop_assert!(LooseInt::Number(n).to_amount("coins").is_err());
        prop_assert!(LooseInt::Text(n.to_string()).to_amount("coins").is_err());
    }

    #[test]
    fn amount_text_never_panics(s in "\\PC*") {
        let _ = LooseInt::Text(s).to_amount("coins");
    }

    #[test]
    fn multiplier_accepted_iff_positive(mantissa in any::<i64>(), scale in 0u32..10) {
        let value = Decimal::new(mantissa, scale);
        prop_assert_eq!(Multiplier::new(value).is_ok(), value > Decimal::ZERO);
    }

    #[test]
    fn calendar_dates_parse_to_themselves(y in 1900i32..2200, ordinal in 1u32..=365) {
        let date = NaiveDate::from_yo_opt(y, ordinal).unwrap();
        let text = date.format("%Y-%m-%d").to_string();
        prop_assert_eq!(parse_due_date("due_date", &text).ok(), Some(date));
        let stamped = format!("{text}T12:00:00.000Z");
        prop_assert_eq!(parse_due_date("due_date", &stamped).ok().map(|d| d.ordinal()), Some(ordinal));
    }

    #[test]
    fn date_parsers_never_panic(s in "\\PC*") {
        let _ = parse_due_date("due_date", &s);
        let _ = parse_timestamp("created_at", &s);
    }

    #[test]
    fn record_decoding_never_panics(s in "\\PC*") {
        let _ = decode_json_list::<TodoRecord, Task>(&s);
        let _ = decode_json_list::<WishRecord, Wish>(&s);
    }
}
