use std::fmt;
use std::sync::Arc;

use unicode_general_category::{get_general_category, GeneralCategory};

use crate::error::MatchError;

/// A parsing expression.
///
/// Expressions are immutable after construction and shared by `Arc`, so
/// sub-expressions may appear in several places at once (the built-in rule
/// bodies are shared by every grammar that inherits them). The constructor
/// helpers below all hand back `Arc<PExpr>` for that reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PExpr {
    /// Matches any single code point; fails at end of input.
    Any,
    /// Matches exactly the given code point.
    Char(char),
    /// Matches any code point in the set.
    Chars(Vec<char>),
    /// Matches any code point in the inclusive range.
    Range(char, char),
    /// Matches a code point belonging to a Unicode category.
    UnicodeCategory(UnicodeCategory),
    /// Matches every child in order. The empty sequence always matches.
    Seq(Vec<Arc<PExpr>>),
    /// Ordered choice: the first alternative that matches wins.
    Alt(Vec<Arc<PExpr>>),
    /// Matches the inner expression zero or one times.
    Maybe(Arc<PExpr>),
    /// Matches the inner expression zero or more times, greedily.
    Star(Arc<PExpr>),
    /// Matches the inner expression one or more times, greedily.
    Plus(Arc<PExpr>),
    /// Positive lookahead: matches iff the inner expression matches, without
    /// consuming input.
    Lookahead(Arc<PExpr>),
    /// Negative lookahead: matches iff the inner expression fails, without
    /// consuming input.
    Not(Arc<PExpr>),
    /// Applies a named rule, optionally passing argument expressions.
    Apply { name: Arc<str>, args: Vec<Arc<PExpr>> },
    /// A placeholder for the i-th argument of the enclosing rule application.
    Param(usize),
}

/// The code point classes recognized by [`PExpr::UnicodeCategory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnicodeCategory {
    Lower,
    Upper,
    Categories(Vec<GeneralCategory>),
}

impl UnicodeCategory {
    // Lower and Upper go through the std char methods, which special-case
    // ASCII; only category lists need the table lookup.
    pub(crate) fn matches(&self, c: char) -> bool {
        match self {
            UnicodeCategory::Lower => c.is_lowercase(),
            UnicodeCategory::Upper => c.is_uppercase(),
            UnicodeCategory::Categories(cats) => cats.contains(&get_general_category(c)),
        }
    }
}

impl PExpr {
    pub fn any() -> Arc<PExpr> {
        Arc::new(PExpr::Any)
    }

    pub fn char(c: char) -> Arc<PExpr> {
        Arc::new(PExpr::Char(c))
    }

    pub fn chars(set: &str) -> Arc<PExpr> {
        Arc::new(PExpr::Chars(set.chars().collect()))
    }

    pub fn range(start: char, end: char) -> Arc<PExpr> {
        Arc::new(PExpr::Range(start, end))
    }

    pub fn unicode_category(category: UnicodeCategory) -> Arc<PExpr> {
        Arc::new(PExpr::UnicodeCategory(category))
    }

    pub fn seq(children: Vec<Arc<PExpr>>) -> Arc<PExpr> {
        Arc::new(PExpr::Seq(children))
    }

    pub fn alt(alternatives: Vec<Arc<PExpr>>) -> Arc<PExpr> {
        Arc::new(PExpr::Alt(alternatives))
    }

    pub fn maybe(inner: Arc<PExpr>) -> Arc<PExpr> {
        Arc::new(PExpr::Maybe(inner))
    }

    pub fn star(inner: Arc<PExpr>) -> Arc<PExpr> {
        Arc::new(PExpr::Star(inner))
    }

    pub fn plus(inner: Arc<PExpr>) -> Arc<PExpr> {
        Arc::new(PExpr::Plus(inner))
    }

    pub fn lookahead(inner: Arc<PExpr>) -> Arc<PExpr> {
        Arc::new(PExpr::Lookahead(inner))
    }

    pub fn not(inner: Arc<PExpr>) -> Arc<PExpr> {
        Arc::new(PExpr::Not(inner))
    }

    pub fn apply(name: &str) -> Arc<PExpr> {
        PExpr::apply_with_args(name, Vec::new())
    }

    pub fn apply_with_args(name: &str, args: Vec<Arc<PExpr>>) -> Arc<PExpr> {
        Arc::new(PExpr::Apply {
            name: Arc::from(name),
            args,
        })
    }

    pub fn param(index: usize) -> Arc<PExpr> {
        Arc::new(PExpr::Param(index))
    }

    /// A literal string, desugared to a single [`PExpr::Char`] or a
    /// [`PExpr::Seq`] of them. The empty string becomes the empty sequence,
    /// which always matches.
    pub fn terminal(s: &str) -> Arc<PExpr> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PExpr::char(c),
            _ => PExpr::seq(s.chars().map(PExpr::char).collect()),
        }
    }

    /// True if a `Param` occurs anywhere in this expression, i.e. the
    /// expression is open with respect to the enclosing application's
    /// arguments.
    pub(crate) fn contains_param(&self) -> bool {
        match self {
            PExpr::Param(_) => true,
            PExpr::Seq(children) | PExpr::Alt(children) => {
                children.iter().any(|c| c.contains_param())
            }
            PExpr::Maybe(inner)
            | PExpr::Star(inner)
            | PExpr::Plus(inner)
            | PExpr::Lookahead(inner)
            | PExpr::Not(inner) => inner.contains_param(),
            PExpr::Apply { args, .. } => args.iter().any(|a| a.contains_param()),
            PExpr::Any
            | PExpr::Char(_)
            | PExpr::Chars(_)
            | PExpr::Range(..)
            | PExpr::UnicodeCategory(_) => false,
        }
    }
}

/// Replaces every `Param(i)` in `expr` with the caller's i-th argument.
///
/// Containers recurse, leaves are returned unchanged, and subtrees that hold
/// no `Param` are shared rather than copied. The result is closed over the
/// caller's frame and safe to evaluate from any other frame.
pub(crate) fn substitute(
    expr: &Arc<PExpr>,
    args: &[Arc<PExpr>],
) -> Result<Arc<PExpr>, MatchError> {
    if !expr.contains_param() {
        return Ok(expr.clone());
    }

    let replaced = match &**expr {
        PExpr::Param(index) => {
            return args.get(*index).cloned().ok_or(MatchError::ParamOutOfRange {
                index: *index,
                arity: args.len(),
            })
        }
        PExpr::Seq(children) => PExpr::Seq(substitute_all(children, args)?),
        PExpr::Alt(alternatives) => PExpr::Alt(substitute_all(alternatives, args)?),
        PExpr::Maybe(inner) => PExpr::Maybe(substitute(inner, args)?),
        PExpr::Star(inner) => PExpr::Star(substitute(inner, args)?),
        PExpr::Plus(inner) => PExpr::Plus(substitute(inner, args)?),
        PExpr::Lookahead(inner) => PExpr::Lookahead(substitute(inner, args)?),
        PExpr::Not(inner) => PExpr::Not(substitute(inner, args)?),
        PExpr::Apply { name, args: inner } => PExpr::Apply {
            name: name.clone(),
            args: substitute_all(inner, args)?,
        },
        // contains_param() returned true, so the node cannot be a leaf
        leaf => leaf.clone(),
    };
    Ok(Arc::new(replaced))
}

fn substitute_all(
    exprs: &[Arc<PExpr>],
    args: &[Arc<PExpr>],
) -> Result<Vec<Arc<PExpr>>, MatchError> {
    exprs.iter().map(|e| substitute(e, args)).collect()
}

fn write_escaped(f: &mut fmt::Formatter, c: char) -> fmt::Result {
    match c {
        '\\' => f.write_str("\\\\"),
        '"' => f.write_str("\\\""),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        c if (c as u32) < 0x20 => write!(f, "\\u{{{:x}}}", c as u32),
        c => write!(f, "{}", c),
    }
}

fn write_joined(f: &mut fmt::Formatter, exprs: &[Arc<PExpr>], sep: &str) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", expr)?;
    }
    Ok(())
}

/// Renders the expression in Ohm source syntax, for traces and test output.
impl fmt::Display for PExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PExpr::Any => f.write_str("any"),
            PExpr::Char(c) => {
                f.write_str("\"")?;
                write_escaped(f, *c)?;
                f.write_str("\"")
            }
            PExpr::Chars(set) => {
                f.write_str("(")?;
                for (i, c) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    f.write_str("\"")?;
                    write_escaped(f, *c)?;
                    f.write_str("\"")?;
                }
                f.write_str(")")
            }
            PExpr::Range(start, end) => {
                f.write_str("\"")?;
                write_escaped(f, *start)?;
                f.write_str("\"..\"")?;
                write_escaped(f, *end)?;
                f.write_str("\"")
            }
            PExpr::UnicodeCategory(UnicodeCategory::Lower) => f.write_str("lower"),
            PExpr::UnicodeCategory(UnicodeCategory::Upper) => f.write_str("upper"),
            PExpr::UnicodeCategory(UnicodeCategory::Categories(cats)) => {
                write!(f, "{:?}", cats)
            }
            PExpr::Seq(children) => {
                f.write_str("(")?;
                write_joined(f, children, " ")?;
                f.write_str(")")
            }
            PExpr::Alt(alternatives) => {
                f.write_str("(")?;
                write_joined(f, alternatives, " | ")?;
                f.write_str(")")
            }
            PExpr::Maybe(inner) => write!(f, "{}?", inner),
            PExpr::Star(inner) => write!(f, "{}*", inner),
            PExpr::Plus(inner) => write!(f, "{}+", inner),
            PExpr::Lookahead(inner) => write!(f, "&{}", inner),
            PExpr::Not(inner) => write!(f, "~{}", inner),
            PExpr::Apply { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    write_joined(f, args, ", ")?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            PExpr::Param(index) => write!(f, "${}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_desugars_to_chars() {
        assert_eq!(*PExpr::terminal("a"), PExpr::Char('a'));
        assert_eq!(
            *PExpr::terminal("ab"),
            PExpr::Seq(vec![PExpr::char('a'), PExpr::char('b')])
        );
        assert_eq!(*PExpr::terminal(""), PExpr::Seq(vec![]));
    }

    #[test]
    fn substitute_replaces_params_with_caller_args() {
        let body = PExpr::seq(vec![PExpr::param(1), PExpr::param(0)]);
        let args = [PExpr::char('a'), PExpr::char('b')];
        let closed = substitute(&body, &args).unwrap();
        assert_eq!(
            *closed,
            PExpr::Seq(vec![PExpr::char('b'), PExpr::char('a')])
        );
    }

    #[test]
    fn substitute_shares_closed_subtrees() {
        let closed = PExpr::seq(vec![PExpr::terminal("xy"), PExpr::apply("letter")]);
        let result = substitute(&closed, &[PExpr::char('a')]).unwrap();
        assert!(Arc::ptr_eq(&closed, &result));
    }

    #[test]
    fn substitute_descends_into_apply_args() {
        let open = PExpr::apply_with_args("ListOf", vec![PExpr::param(0), PExpr::char(',')]);
        let result = substitute(&open, &[PExpr::char('x')]).unwrap();
        assert_eq!(
            *result,
            PExpr::Apply {
                name: Arc::from("ListOf"),
                args: vec![PExpr::char('x'), PExpr::char(',')],
            }
        );
    }

    #[test]
    fn substitute_rejects_out_of_range_params() {
        let open = PExpr::star(PExpr::param(2));
        let err = substitute(&open, &[PExpr::char('a')]).unwrap_err();
        assert_eq!(err, MatchError::ParamOutOfRange { index: 2, arity: 1 });
    }

    #[test]
    fn display_renders_ohm_syntax() {
        let expr = PExpr::seq(vec![
            PExpr::terminal("if"),
            PExpr::not(PExpr::range('a', 'z')),
            PExpr::maybe(PExpr::apply("spaces")),
        ]);
        assert_eq!(expr.to_string(), "((\"i\" \"f\") ~\"a\"..\"z\" spaces?)");
    }
}
