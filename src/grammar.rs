use std::collections::HashMap;
use std::sync::Arc;

use crate::error::MatchError;
use crate::expr::PExpr;
use crate::matcher::{rule_lexicality, MatchState};

/// A named set of rules, with an optional super-grammar consulted when a
/// rule name is not defined locally.
///
/// Grammars are immutable after construction and freely shareable: many
/// matches (including on other threads) may borrow the same grammar at once.
#[derive(Debug)]
pub struct Grammar {
    rules: HashMap<String, Arc<PExpr>>,
    super_grammar: Option<Arc<Grammar>>,
}

impl Grammar {
    pub fn new<N, R>(rules: R, super_grammar: Option<Arc<Grammar>>) -> Grammar
    where
        N: Into<String>,
        R: IntoIterator<Item = (N, Arc<PExpr>)>,
    {
        Grammar {
            rules: rules
                .into_iter()
                .map(|(name, body)| (name.into(), body))
                .collect(),
            super_grammar,
        }
    }

    /// Resolves a rule name against this grammar and its super-grammar
    /// chain, nearest grammar first.
    pub fn rule(&self, name: &str) -> Option<&Arc<PExpr>> {
        let mut grammar = self;
        loop {
            if let Some(body) = grammar.rules.get(name) {
                return Some(body);
            }
            grammar = grammar.super_grammar.as_deref()?;
        }
    }

    pub fn super_grammar(&self) -> Option<&Arc<Grammar>> {
        self.super_grammar.as_ref()
    }

    /// Reports whether `name`, anchored at end of input, matches all of
    /// `input`.
    ///
    /// The rule is wrapped in the synthetic sequence `<name> end`, so success
    /// means the whole string was consumed (modulo trailing whitespace when
    /// `name` is syntactic). The match itself is the `Ok` value; `Err` is
    /// reserved for structural problems with the grammar.
    pub fn matches_rule(&self, name: &str, input: &str) -> Result<bool, MatchError> {
        // The root frame inherits the rule's own lexicality, so a syntactic
        // start rule also skips whitespace around itself and before `end`.
        let root_lexical = rule_lexicality(name)?;
        let body = PExpr::seq(vec![PExpr::apply(name), PExpr::apply("end")]);
        let mut state = MatchState::new(self, input, root_lexical);
        state.eval(&body)
    }

    /// Like [`matches_rule`](Grammar::matches_rule), for input that is not
    /// yet known to be valid UTF-8.
    pub fn matches_rule_bytes(&self, name: &str, input: &[u8]) -> Result<bool, MatchError> {
        let input = std::str::from_utf8(input)
            .map_err(|e| MatchError::InvalidUtf8 { pos: e.valid_up_to() })?;
        self.matches_rule(name, input)
    }
}
