//! Field checks shared by the request payloads in `models`.
//!
//! Every check appends to a `FieldErrors` instead of returning early, so one
//! response reports every bad field at once.

use crate::error::FieldErrors;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Unwraps a required value, recording an error when it is absent.
pub fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

/// Non-blank text of at most `max` characters.
pub fn text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
    } else {
        max_length(errors, field, value, max);
    }
}

pub fn max_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
    }
}

/// URL-safe identifier: letters, digits, hyphens and underscores.
pub fn slug(errors: &mut FieldErrors, field: &str, value: &str) {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if value.is_empty() {
        errors.add(field, BLANK);
    } else if !valid {
        errors.add(
            field,
            "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
        );
    } else {
        max_length(errors, field, value, 60);
    }
}

pub fn email(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.parse::<lettre::Address>().is_err() {
        errors.add(field, "Enter a valid email address.");
    } else {
        max_length(errors, field, value, 254);
    }
}

pub fn score(errors: &mut FieldErrors, field: &str, value: i32) {
    if !(1..=10).contains(&value) {
        errors.add(field, format!("\"{value}\" is not a valid choice."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rejects_spaces_and_accepts_dashes() {
        let mut errors = FieldErrors::new();
        slug(&mut errors, "slug", "sci-fi_2");
        assert!(errors.is_empty());

        slug(&mut errors, "slug", "sci fi");
        assert_eq!(errors.get("slug").map(|m| m.len()), Some(1));
    }

    #[test]
    fn score_bounds_are_inclusive() {
        let mut errors = FieldErrors::new();
        score(&mut errors, "score", 1);
        score(&mut errors, "score", 10);
        assert!(errors.is_empty());

        score(&mut errors, "score", 0);
        score(&mut errors, "score", 11);
        assert_eq!(errors.get("score").map(|m| m.len()), Some(2));
    }

    #[test]
    fn email_requires_an_at_sign_and_domain() {
        let mut errors = FieldErrors::new();
        email(&mut errors, "email", "reader@example.com");
        assert!(errors.is_empty());

        email(&mut errors, "email", "not-an-email");
        assert!(errors.get("email").is_some());
    }

    #[test]
    fn text_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        text(&mut errors, "text", &"я".repeat(200), 200);
        assert!(errors.is_empty());

        text(&mut errors, "text", "   ", 200);
        assert_eq!(errors.get("text").unwrap()[0], BLANK);
    }
}
