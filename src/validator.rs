//! Syntactic URL acceptance check
//!
//! Runs before any network access. A string is accepted when it is an
//! `ftp`, `http` or `https` URL followed by at least one character that is
//! neither a space nor a double quote. The accepted string is kept exactly as
//! submitted.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::PipelineError;

const URL_PATTERN: &str = r#"^(ftp|http|https)://[^ "]+$"#;

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"));

/// A submitted string that passed syntactic validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateUrl(String);

impl CandidateUrl {
    /// The URL exactly as submitted
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host part, when the string also parses as a WHATWG URL
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.0)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CandidateUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CandidateUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a raw input string.
///
/// Empty or whitespace-only input is `EmptyInput`; anything else that does
/// not match the URL pattern is `InvalidSyntax`. No trimming or decoding is
/// applied to accepted input.
pub fn validate(input: &str) -> Result<CandidateUrl, PipelineError> {
    if input.trim().is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    if !URL_REGEX.is_match(input) {
        return Err(PipelineError::InvalidSyntax);
    }

    Ok(CandidateUrl(input.to_string()))
}
