//! Subject codes
//!
//! A subject code is the primary key for a subject's resources: two or three
//! letters followed by three digits, stored uppercase (e.g. "CSE211"). Codes
//! are parsed strictly from single-token input and scanned loosely out of
//! free-form chat text.

use std::fmt;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::{Error, Result};

// Word-bounded so "ABCD123" or "CSE2110" never match inside running text.
const CODE_PATTERN: &str = r"\b[A-Za-z]{2,3}[0-9]{3}\b";

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CODE_PATTERN).expect("static pattern compiles"))
}

/// A normalized course identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectCode(String);

impl SubjectCode {
    /// Parse a subject code from single-token input
    ///
    /// Trims whitespace and uppercases; the token must be exactly 2-3
    /// letters followed by 3 digits.
    pub fn parse(input: &str) -> Result<Self> {
        let token = input.trim();
        if Self::is_valid_token(token) {
            Ok(Self(token.to_ascii_uppercase()))
        } else {
            Err(Error::InvalidSubjectCode(token.to_string()))
        }
    }

    /// Find the first subject-code-shaped token inside free text
    pub fn find_in(text: &str) -> Option<Self> {
        code_regex()
            .find(text)
            .map(|m| Self(m.as_str().to_ascii_uppercase()))
    }

    /// The normalized uppercase form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Internal: exact-match validation for single-token input
    fn is_valid_token(token: &str) -> bool {
        if !token.is_ascii() || !(5..=6).contains(&token.len()) {
            return false;
        }
        let (letters, digits) = token.split_at(token.len() - 3);
        letters.chars().all(|c| c.is_ascii_alphabetic())
            && digits.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for SubjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a human-readable subject name (3-100 characters after trimming)
pub fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if (3..=100).contains(&name.chars().count()) {
        Ok(name)
    } else {
        Err(Error::InvalidSubjectName)
    }
}
