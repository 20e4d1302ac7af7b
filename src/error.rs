use regex_automata::nfa::thompson;

/// An error that occurs when construction of an [`Engine`](crate::Engine)
/// fails.
///
/// A build error is generally a result of one of two possible failure modes.
/// First is a parse or syntax error in the concrete syntax of a pattern.
/// Second is that the construction of the underlying NFA exceeded a
/// configured limit, such as the nest limit or the total compiled size.
///
/// When the `std` feature is enabled, this implements the `std::error::Error`
/// trait, and `source()` returns the underlying parser or compiler error.
#[derive(Clone, Debug)]
pub struct BuildError {
    kind: BuildErrorKind,
}

#[derive(Clone, Debug)]
enum BuildErrorKind {
    Syntax(regex_syntax::Error),
    Complexity(thompson::BuildError),
    Config(String),
}

impl BuildError {
    pub(crate) fn syntax(err: regex_syntax::Error) -> BuildError {
        BuildError { kind: BuildErrorKind::Syntax(err) }
    }

    pub(crate) fn nfa(err: thompson::BuildError) -> BuildError {
        BuildError { kind: BuildErrorKind::Complexity(err) }
    }

    pub(crate) fn config(msg: impl Into<String>) -> BuildError {
        BuildError { kind: BuildErrorKind::Config(msg.into()) }
    }

    /// If it is known that this error occurred because of a syntax error in
    /// the pattern, then return the underlying parse error.
    pub fn syntax_error(&self) -> Option<&regex_syntax::Error> {
        match self.kind {
            BuildErrorKind::Syntax(ref err) => Some(err),
            _ => None,
        }
    }

    /// Returns true when this error occurred because a size or recursion
    /// limit was exceeded while compiling the pattern into an NFA.
    pub fn is_complexity(&self) -> bool {
        matches!(self.kind, BuildErrorKind::Complexity(_))
    }

    /// Returns true when this error occurred because the given configuration
    /// failed validation.
    pub fn is_config(&self) -> bool {
        matches!(self.kind, BuildErrorKind::Config(_))
    }
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.kind {
            // The parser's message is reported verbatim so that callers see
            // the same errors that other regex engines in this family report.
            BuildErrorKind::Syntax(ref err) => err.fmt(f),
            BuildErrorKind::Complexity(ref err) => err.fmt(f),
            BuildErrorKind::Config(ref msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            BuildErrorKind::Syntax(ref err) => Some(err),
            BuildErrorKind::Complexity(ref err) => Some(err),
            BuildErrorKind::Config(_) => None,
        }
    }
}
