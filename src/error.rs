use thiserror::Error;

/// A structural error: the grammar or the input is malformed and the match
/// cannot proceed meaningfully.
///
/// Structural errors are disjoint from match failure. A rule that simply does
/// not match reports `Ok(false)` from [`Grammar::matches_rule`] and restores
/// the cursor; a structural error aborts the whole match and is not caught by
/// ordered choice, negation, or repetition along the way.
///
/// [`Grammar::matches_rule`]: crate::Grammar::matches_rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// No grammar in the super-grammar chain defines the applied rule.
    #[error("unknown rule \"{0}\"")]
    UnknownRule(String),

    /// The input is not valid UTF-8. `pos` is the byte offset of the first
    /// invalid sequence.
    #[error("invalid utf-8 sequence at byte {pos}")]
    InvalidUtf8 { pos: usize },

    /// A parameter placeholder referred to an argument the enclosing rule
    /// application does not have.
    #[error("parameter index {index} out of range for an application with {arity} arguments")]
    ParamOutOfRange { index: usize, arity: usize },

    /// A rule name was empty or did not begin with a letter, so its
    /// lexical/syntactic status cannot be determined.
    #[error("malformed rule name \"{0}\": rule names must begin with a letter")]
    BadRuleName(String),
}
