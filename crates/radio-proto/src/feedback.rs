/// One line of user feedback, as typed at the `Feedback:` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Skip,
    /// Rating kept as the digits the user typed.
    Rate(String),
    Ignored,
}

impl Feedback {
    /// Only an exact `skip` or a non-empty run of ASCII digits means
    /// something; a sign, whitespace or any other text is ignored.
    pub fn parse(line: &str) -> Self {
        if line == "skip" {
            Self::Skip
        } else if !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) {
            Self::Rate(line.to_string())
        } else {
            Self::Ignored
        }
    }
}
