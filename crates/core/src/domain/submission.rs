// Source Submission Domain Model

/// Characters stripped from both ends of submitted code before scanning.
const TRIM_CHARS: &[char] = &[' ', '\t', '\n'];

/// Candidate code plus the per-call scan switch.
///
/// Owned by the call that creates it and never retained after execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSubmission {
    code: String,
    scan: bool,
}

impl SourceSubmission {
    /// Create a submission. Surrounding spaces, tabs and newlines are stripped.
    pub fn new(code: impl Into<String>, scan: bool) -> Self {
        let code = code.into();
        let trimmed = code.trim_matches(TRIM_CHARS);
        let code = if trimmed.len() == code.len() {
            code
        } else {
            trimmed.to_string()
        };
        Self { code, scan }
    }

    /// Submission that goes through the static scanner
    pub fn scanned(code: impl Into<String>) -> Self {
        Self::new(code, true)
    }

    /// Submission that skips the static scanner
    pub fn unscanned(code: impl Into<String>) -> Self {
        Self::new(code, false)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn scan(&self) -> bool {
        self.scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_surrounding_blank_chars() {
        let submission = SourceSubmission::scanned("\n\t  print('hi')  \n\n");
        assert_eq!(submission.code(), "print('hi')");
        assert!(submission.scan());
    }

    #[test]
    fn test_keeps_inner_indentation() {
        let code = "for i in range(2):\n    print(i)";
        let submission = SourceSubmission::unscanned(format!("\n{}\n", code));
        assert_eq!(submission.code(), code);
        assert!(!submission.scan());
    }

    #[test]
    fn test_carriage_returns_are_not_stripped() {
        let submission = SourceSubmission::scanned("pass\r\n");
        assert_eq!(submission.code(), "pass\r");
    }
}
