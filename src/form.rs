//! The "new post" form: parsing, validation and the error state carried
//! across the redirect after a failed submission.

use serde::{Deserialize, Serialize};

/// Old input longer than this is cut before it goes into the flash cookie.
pub const OLD_INPUT_MAX_BYTES: usize = 512;
/// Browsers drop cookies above roughly 4 KiB.
pub const FLASH_MAX_BYTES: usize = 3072;

/// Raw form body. Every field is optional so that a missing field fails
/// validation instead of the form guard.
#[derive(Debug, Default, FromForm)]
pub struct PostForm {
    #[field(name = "_token")]
    pub token: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// What the form page needs to show a failed submission again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedSubmission {
    pub errors: Vec<FieldError>,
    pub old_title: String,
    pub old_description: String,
}

pub enum Submission {
    Valid(NewPost),
    Invalid(FailedSubmission),
}

impl PostForm {
    pub fn validate(&self) -> Submission {
        let title = self.title.as_deref().unwrap_or("").trim();
        let description = self.description.as_deref().unwrap_or("").trim();

        if title.is_empty() {
            return Submission::Invalid(FailedSubmission {
                errors: vec![FieldError::new("title", "The title field is required.")],
                old_title: self.title.clone().unwrap_or_default(),
                old_description: self.description.clone().unwrap_or_default(),
            });
        }

        Submission::Valid(NewPost {
            title: title.to_string(),
            description: description.to_string(),
        })
    }
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl FailedSubmission {
    /// URL-safe base64 of the JSON form, bounded to fit in a flash cookie.
    /// Old input is truncated, and dropped entirely if still too large.
    pub fn encode(&self) -> String {
        let mut bounded = FailedSubmission {
            errors: self.errors.clone(),
            old_title: truncate_bytes(&self.old_title, OLD_INPUT_MAX_BYTES),
            old_description: truncate_bytes(&self.old_description, OLD_INPUT_MAX_BYTES),
        };
        let mut encoded = bounded.to_base64();
        if encoded.len() > FLASH_MAX_BYTES {
            bounded.old_title.clear();
            bounded.old_description.clear();
            encoded = bounded.to_base64();
        }
        encoded
    }

    pub fn decode(s: &str) -> Option<Self> {
        let bytes = base64::decode_config(s, base64::URL_SAFE_NO_PAD).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn to_base64(&self) -> String {
        base64::encode_config(serde_json::to_vec(self).unwrap_or_default(), base64::URL_SAFE_NO_PAD)
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn truncate_bytes(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: Option<&str>, description: Option<&str>) -> PostForm {
        PostForm {
            token: None,
            title: title.map(str::to_string),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn valid_form_is_trimmed() {
        match form(Some("  test "), Some("description\n")).validate() {
            Submission::Valid(p) => {
                assert_eq!(p.title, "test");
                assert_eq!(p.description, "description");
            }
            Submission::Invalid(f) => panic!("unexpected errors: {:?}", f.errors),
        }
    }

    #[test]
    fn empty_title_is_rejected_and_old_input_kept() {
        let Submission::Invalid(failed) = form(Some(""), Some("keep me")).validate() else {
            panic!("empty title accepted");
        };
        assert_eq!(failed.error_for("title"), Some("The title field is required."));
        assert_eq!(failed.error_for("description"), None);
        assert_eq!(failed.old_description, "keep me");
    }

    #[test]
    fn description_is_optional() {
        let Submission::Valid(post) = form(Some("hello"), None).validate() else {
            panic!("title-only submission rejected");
        };
        assert_eq!(post.title, "hello");
        assert_eq!(post.description, "");
    }

    #[test]
    fn long_titles_are_accepted() {
        let long = "a".repeat(300);
        assert!(matches!(form(Some(&long), Some("d")).validate(), Submission::Valid(_)));
    }

    #[test]
    fn whitespace_title_is_rejected() {
        let Submission::Invalid(failed) = form(Some("   \t"), Some("d")).validate() else {
            panic!("blank title accepted");
        };
        assert_eq!(failed.errors.len(), 1);
    }

    #[test]
    fn failed_submission_survives_cookie_encoding() {
        let Submission::Invalid(failed) = form(Some(""), Some("a; b, \"c\"")).validate() else {
            panic!();
        };
        let encoded = failed.encode();
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(FailedSubmission::decode(&encoded), Some(failed));
        assert_eq!(FailedSubmission::decode("!!"), None);
    }

    #[test]
    fn large_old_input_stays_within_cookie_limit() {
        let big = "x".repeat(30_000);
        let Submission::Invalid(failed) = form(Some(&" ".repeat(5_000)), Some(&big)).validate() else {
            panic!();
        };
        let encoded = failed.encode();
        assert!(encoded.len() < 4096);
        let decoded = FailedSubmission::decode(&encoded).unwrap();
        assert_eq!(decoded.error_for("title"), Some("The title field is required."));
        assert_eq!(decoded.old_description.len(), OLD_INPUT_MAX_BYTES);
    }

    #[test]
    fn escape_heavy_old_input_is_dropped_when_too_large() {
        // Control characters expand sixfold in JSON.
        let noisy = "\u{1}".repeat(OLD_INPUT_MAX_BYTES);
        let failed = FailedSubmission {
            errors: vec![FieldError::new("title", "The title field is required.")],
            old_title: noisy.clone(),
            old_description: noisy,
        };
        let encoded = failed.encode();
        assert!(encoded.len() <= FLASH_MAX_BYTES);
        let decoded = FailedSubmission::decode(&encoded).unwrap();
        assert_eq!(decoded.errors, failed.errors);
        assert!(decoded.old_description.is_empty());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_bytes("ééé", 3), "é");
        assert_eq!(truncate_bytes("abc", 10), "abc");
    }
}
