// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Coercions applied where flattened fields are consumed.
//
// The remote service is loose about numbers: counts can come back empty,
// missing, or with trailing garbage. Integers are read the lenient way:
// optional whitespace, optional sign, then leading digits; anything else is 0.
// Digit runs that do not fit an i64 saturate.

use crate::api::Record;

/// Leading-integer parse. Missing or non-numeric input yields 0.
pub(crate) fn int(value: Option<&str>) -> i64 {
    let Some(value) = value else {
        return 0;
    };

    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    let parsed = digits[..end].bytes().try_fold(0i64, |acc, b| {
        let digit = i64::from(b - b'0');
        let acc = acc.checked_mul(10)?;
        if negative {
            acc.checked_sub(digit)
        } else {
            acc.checked_add(digit)
        }
    });

    match parsed {
        Some(n) => n,
        None if negative => i64::MIN,
        None => i64::MAX,
    }
}

/// Like [`int`], clamped at zero.
pub(crate) fn count(value: Option<&str>) -> u64 {
    u64::try_from(int(value)).unwrap_or(0)
}

/// A boolean field is true when it is present at all, as piwik answers
/// `<success message="ok" />`. Missing is false.
pub(crate) fn flag(record: &Record, field: &str) -> bool {
    record.contains(field)
}
