//! Access code gate for protocol 2.
//!
//! The code is `AURORA` followed by the letters `M I S I O N 2`, each
//! preceded by exactly one arbitrary character. Matching is anchored at
//! both ends and case-sensitive, and no trimming is applied here.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AccessCodeError;

/// `(?s)` lets `.` match newlines too: any single character is allowed.
static ACCESS_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\AAURORA.M.I.S.I.O.N.2\z").expect("access code pattern is valid")
});

/// Format hint shown with rejected codes.
pub const FORMAT_HINT: &str = "AURORAxMxIxSxIxOxNx2 (donde x = cualquier carácter)";

/// Returns `true` if `input` is a valid access code.
#[must_use]
pub fn validate_access_code(input: &str) -> bool {
    ACCESS_CODE.is_match(input)
}

/// Classifies an access code submission.
///
/// # Errors
///
/// Returns [`AccessCodeError::Empty`] for an empty submission and
/// [`AccessCodeError::Invalid`] for any other non-matching input.
pub fn check_access_code(input: &str) -> Result<(), AccessCodeError> {
    if input.is_empty() {
        Err(AccessCodeError::Empty)
    } else if validate_access_code(input) {
        Ok(())
    } else {
        Err(AccessCodeError::Invalid)
    }
}
