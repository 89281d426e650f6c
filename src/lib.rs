//! A matching engine for Ohm-style parsing expression grammars.
//!
//! A [`Grammar`] maps rule names to [`PExpr`] expression trees and optionally
//! extends a super-grammar; [`Grammar::matches_rule`] decides whether a rule,
//! anchored at end of input, matches an input string.
//!
//! The engine implements the Ohm dialect of PEGs: ordered choice with
//! transactional backtracking, parameterized rules with call-site argument
//! substitution, rule memoization, and the lexical/syntactic distinction —
//! a rule whose name starts with an uppercase letter implicitly skips
//! whitespace (the `spaces` rule) before each sub-expression of its body,
//! while a lowercase rule matches its input verbatim.
//!
//! ```
//! use ohm::{built_in_rules, Grammar, PExpr};
//!
//! // start = "a"* "b"
//! let g = Grammar::new(
//!     vec![(
//!         "start",
//!         PExpr::seq(vec![PExpr::star(PExpr::terminal("a")), PExpr::terminal("b")]),
//!     )],
//!     Some(built_in_rules()),
//! );
//!
//! assert_eq!(g.matches_rule("start", "aaab"), Ok(true));
//! assert_eq!(g.matches_rule("start", "aaa"), Ok(false));
//! ```
//!
//! Two grammar layers are always available: [`primitive_rules`] (character
//! primitives) and [`built_in_rules`] (the standard `letter`/`digit`/`end`/
//! `spaces` rules and the `ListOf` combinators). User grammars normally name
//! `built_in_rules()` as their super-grammar. On top of both sits
//! [`ohm_grammar`], the bootstrap grammar describing Ohm grammar source
//! itself; it accepts its own textual form, [`OHM_GRAMMAR_SOURCE`].
//!
//! Match failure and malformed-grammar conditions are reported separately:
//! the former is the `Ok(bool)` outcome of a match, the latter a
//! [`MatchError`] that aborts it (see the type's docs for the distinction).
//!
//! The `trace` cargo feature prints every rule application, outcome, and
//! memo hit to stdout while matching.

mod builtins;
mod error;
mod expr;
mod grammar;
mod matcher;
mod meta;

pub use crate::builtins::{built_in_rules, primitive_rules};
pub use crate::error::MatchError;
pub use crate::expr::{PExpr, UnicodeCategory};
pub use crate::grammar::Grammar;
pub use crate::meta::{ohm_grammar, OHM_GRAMMAR_SOURCE};

// Re-exported so `UnicodeCategory::Categories` lists can be built without
// naming the category crate directly.
pub use unicode_general_category::GeneralCategory;
