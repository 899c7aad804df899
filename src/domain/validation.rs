//! Property-level validation for catalog payloads.
//!
//! Violations are collected rather than short-circuited, so a client sees
//! every problem with a payload in one response.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::DomainError;
use super::repositories::{NewBook, NewReview};
use crate::models::book::BookDraft;
use crate::models::review::ReviewDraft;

pub const NOT_BLANK: &str = "This value should not be blank.";
pub const NOT_NULL: &str = "This value should not be null.";
pub const INVALID_ISBN: &str = "This value is neither a valid ISBN-10 nor a valid ISBN-13.";
pub const INVALID_DATETIME: &str = "This value is not a valid datetime.";
pub const RATING_OUT_OF_RANGE: &str = "This value should be between 0 and 5.";

pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub property_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(property_path: &str, message: &str) -> Self {
        Self {
            property_path: property_path.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property_path, self.message)
    }
}

#[derive(Debug, Default)]
struct Violations(Vec<Violation>);

impl Violations {
    fn add(&mut self, property_path: &str, message: &str) {
        self.0.push(Violation::new(property_path, message));
    }

    /// Returns the trimmed-to-check value, recording a violation when blank
    fn not_blank(&mut self, property_path: &str, value: Option<String>) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                self.add(property_path, NOT_BLANK);
                String::new()
            }
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, DomainError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}

/// Validate a create (or patched) payload into persistable values
pub fn validate_book(draft: BookDraft) -> Result<NewBook, DomainError> {
    let mut violations = Violations::default();

    let isbn = draft.isbn.map(|i| i.trim().to_string());
    if let Some(isbn) = &isbn
        && !is_valid_isbn(isbn)
    {
        violations.add("isbn", INVALID_ISBN);
    }

    let title = violations.not_blank("title", draft.title);
    let description = violations.not_blank("description", draft.description);
    let author = violations.not_blank("author", draft.author);

    let publication_date = match draft.publication_date {
        None => {
            violations.add("publicationDate", NOT_NULL);
            String::new()
        }
        Some(raw) => normalize_datetime(&raw).unwrap_or_else(|| {
            violations.add("publicationDate", INVALID_DATETIME);
            String::new()
        }),
    };

    violations.into_result(NewBook {
        isbn,
        title,
        description,
        author,
        publication_date,
        archived: draft.archived.unwrap_or(false),
        cover: draft.cover,
    })
}

/// Validate a review payload. Whether the book exists is checked by the caller.
pub fn validate_review(draft: ReviewDraft) -> Result<NewReview, DomainError> {
    let mut violations = Violations::default();

    let book_id = match draft.book_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            violations.add("bookId", NOT_NULL);
            String::new()
        }
    };

    let body = violations.not_blank("body", draft.body);

    let rating = match draft.rating {
        None => {
            violations.add("rating", NOT_NULL);
            0
        }
        Some(r) if !(MIN_RATING..=MAX_RATING).contains(&r) => {
            violations.add("rating", RATING_OUT_OF_RANGE);
            r
        }
        Some(r) => r,
    };

    let publication_date = draft.publication_date.and_then(|raw| {
        let normalized = normalize_datetime(&raw);
        if normalized.is_none() {
            violations.add("publicationDate", INVALID_DATETIME);
        }
        normalized
    });

    violations.into_result(NewReview {
        book_id,
        body,
        rating,
        author: draft.author,
        publication_date,
    })
}

/// Parse RFC 3339 (or a bare `YYYY-MM-DD`) and render it as RFC 3339 UTC
pub fn normalize_datetime(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc).to_rfc3339());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().to_rfc3339())
}

/// ISBN-10 or ISBN-13, hyphens and spaces ignored
pub fn is_valid_isbn(raw: &str) -> bool {
    let cleaned: String = raw.chars().filter(|c| *c != '-' && *c != ' ').collect();
    match cleaned.len() {
        10 => is_valid_isbn10(&cleaned),
        13 => is_valid_isbn13(&cleaned),
        _ => false,
    }
}

fn is_valid_isbn10(isbn: &str) -> bool {
    let mut sum = 0;
    for (i, c) in isbn.chars().enumerate() {
        let value = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'X' | 'x' if i == 9 => 10,
            _ => return false,
        };
        sum += value * (10 - i as u32);
    }
    sum % 11 == 0
}

fn is_valid_isbn13(isbn: &str) -> bool {
    if !isbn.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    isbn13_weighted_sum(isbn) % 10 == 0
}

fn isbn13_weighted_sum(digits: &str) -> u32 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
        .sum()
}

/// Complete a 12-digit prefix into a valid ISBN-13
pub fn complete_isbn13(prefix: &str) -> Option<String> {
    if prefix.len() != 12 || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let check = (10 - isbn13_weighted_sum(prefix) % 10) % 10;
    Some(format!("{}{}", prefix, check))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> BookDraft {
        BookDraft {
            isbn: Some("0099740915".to_string()),
            title: Some("The Handmaid's Tale".to_string()),
            description: Some("Brilliantly conceived and executed.".to_string()),
            author: Some("Margaret Atwood".to_string()),
            publication_date: Some("1985-07-31T00:00:00+00:00".to_string()),
            archived: None,
            cover: None,
        }
    }

    fn violations(err: DomainError) -> Vec<Violation> {
        match err {
            DomainError::Validation(v) => v,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_isbn10_and_isbn13() {
        assert!(is_valid_isbn("0099740915"));
        assert!(is_valid_isbn("0306406152"));
        assert!(is_valid_isbn("9786644879585"));
        assert!(is_valid_isbn("978-0-441-17271-9"));
        assert!(is_valid_isbn("080442957X"));
    }

    #[test]
    fn rejects_bad_isbns() {
        assert!(!is_valid_isbn("invalid"));
        assert!(!is_valid_isbn("0099740914"));
        assert!(!is_valid_isbn("9786644879586"));
        assert!(!is_valid_isbn("X099740915"));
        assert!(!is_valid_isbn(""));
    }

    #[test]
    fn completes_isbn13_check_digit() {
        assert_eq!(complete_isbn13("978044117271").as_deref(), Some("9780441172719"));
        assert_eq!(complete_isbn13("978030640615").as_deref(), Some("9780306406157"));
        assert!(complete_isbn13("97803064061").is_none());
    }

    #[test]
    fn valid_draft_is_normalized() {
        let book = validate_book(full_draft()).unwrap();
        assert_eq!(book.title, "The Handmaid's Tale");
        assert_eq!(book.publication_date, "1985-07-31T00:00:00+00:00");
        assert!(!book.archived);
    }

    #[test]
    fn bare_date_becomes_midnight_utc() {
        assert_eq!(
            normalize_datetime("1985-07-31").as_deref(),
            Some("1985-07-31T00:00:00+00:00")
        );
        assert_eq!(
            normalize_datetime("1985-07-31T02:00:00+02:00").as_deref(),
            Some("1985-07-31T00:00:00+00:00")
        );
        assert!(normalize_datetime("last tuesday").is_none());
    }

    #[test]
    fn invalid_isbn_only_payload_reports_every_field_in_order() {
        let draft = BookDraft {
            isbn: Some("invalid".to_string()),
            ..Default::default()
        };
        let reported = violations(validate_book(draft).unwrap_err());

        let paths: Vec<&str> = reported.iter().map(|v| v.property_path.as_str()).collect();
        assert_eq!(
            paths,
            ["isbn", "title", "description", "author", "publicationDate"]
        );
        assert_eq!(reported[0].message, INVALID_ISBN);
        assert_eq!(reported[1].message, NOT_BLANK);
        assert_eq!(reported[4].message, NOT_NULL);
    }

    #[test]
    fn whitespace_counts_as_blank() {
        let draft = BookDraft {
            title: Some("   ".to_string()),
            ..full_draft()
        };
        let reported = violations(validate_book(draft).unwrap_err());
        assert_eq!(reported, vec![Violation::new("title", NOT_BLANK)]);
    }

    #[test]
    fn review_rating_must_be_in_range() {
        let draft = ReviewDraft {
            book_id: Some("some-book".to_string()),
            body: Some("Loved it".to_string()),
            rating: Some(6),
            ..Default::default()
        };
        let reported = violations(validate_review(draft).unwrap_err());
        assert_eq!(reported, vec![Violation::new("rating", RATING_OUT_OF_RANGE)]);
    }

    #[test]
    fn review_requires_book_body_and_rating() {
        let reported = violations(validate_review(ReviewDraft::default()).unwrap_err());
        let paths: Vec<&str> = reported.iter().map(|v| v.property_path.as_str()).collect();
        assert_eq!(paths, ["bookId", "body", "rating"]);
    }
}
