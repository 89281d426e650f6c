use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::MatchError;
use crate::expr::{substitute, PExpr};
use crate::grammar::Grammar;

/// The application evaluated implicitly before each sub-expression of a
/// syntactic rule. Kept as a single shared node so the skip itself is
/// recognizable and does not recurse.
static SPACES: Lazy<Arc<PExpr>> = Lazy::new(|| PExpr::apply("spaces"));

/// One memoized outcome for a (rule name, entry cursor) pair. On a hit the
/// cursor jumps to the stored end without re-evaluating the rule body.
#[derive(Clone, Copy)]
enum MemoEntry {
    Matched(usize),
    Failed,
}

/// Stack entry for one active rule application.
struct CallFrame {
    /// Argument list of the application, already substituted against the
    /// caller, so `Param` nodes in the rule body resolve directly here.
    args: Vec<Arc<PExpr>>,
    /// Cursor at rule entry.
    pos: usize,
    /// True when the applied rule's name begins with a lowercase letter.
    /// Syntactic frames (lexical = false) skip whitespace before each
    /// sub-expression of the body.
    lexical: bool,
}

pub(crate) struct MatchState<'a> {
    grammar: &'a Grammar,
    input: &'a str,
    pos: usize,
    stack: Vec<CallFrame>,
    memo: HashMap<(Arc<str>, usize), MemoEntry>,
}

/// Decides whether `name` names a lexical (lowercase-initial) or syntactic
/// rule. Anything that does not start with a letter cannot be classified and
/// is a structural error.
pub(crate) fn rule_lexicality(name: &str) -> Result<bool, MatchError> {
    match name.chars().next() {
        Some(c) if c.is_alphabetic() => Ok(c.is_lowercase()),
        _ => Err(MatchError::BadRuleName(name.to_string())),
    }
}

fn is_spaces_application(expr: &PExpr) -> bool {
    matches!(expr, PExpr::Apply { name, .. } if &**name == "spaces")
}

impl<'a> MatchState<'a> {
    pub(crate) fn new(grammar: &'a Grammar, input: &'a str, root_lexical: bool) -> MatchState<'a> {
        MatchState {
            grammar,
            input,
            pos: 0,
            stack: vec![CallFrame {
                args: Vec::new(),
                pos: 0,
                lexical: root_lexical,
            }],
            memo: HashMap::new(),
        }
    }

    fn frame(&self) -> &CallFrame {
        self.stack.last().expect("call stack is never empty during evaluation")
    }

    /// Evaluates one expression transactionally: on failure the cursor is
    /// restored to its entry value. Within a syntactic frame, an implicit
    /// `spaces` application runs first, except before `spaces` itself.
    pub(crate) fn eval(&mut self, expr: &PExpr) -> Result<bool, MatchError> {
        let pos = self.pos;

        if !self.frame().lexical && !is_spaces_application(expr) {
            self.eval(&SPACES)?;
        }

        let matched = self.eval_expr(expr)?;
        if !matched {
            self.pos = pos;
        }
        Ok(matched)
    }

    fn eval_expr(&mut self, expr: &PExpr) -> Result<bool, MatchError> {
        match expr {
            PExpr::Any => Ok(self.eat_if(|_| true)),
            PExpr::Char(c) => Ok(self.eat_if(|actual| actual == *c)),
            PExpr::Chars(set) => Ok(self.eat_if(|c| set.contains(&c))),
            PExpr::Range(start, end) => Ok(self.eat_if(|c| *start <= c && c <= *end)),
            PExpr::UnicodeCategory(category) => Ok(self.eat_if(|c| category.matches(c))),

            PExpr::Seq(children) => {
                for child in children {
                    if !self.eval(child)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            PExpr::Alt(alternatives) => {
                for alternative in alternatives {
                    if self.eval(alternative)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }

            PExpr::Maybe(inner) => {
                self.eval(inner)?;
                Ok(true)
            }

            PExpr::Star(inner) => self.eval_repeat(inner),

            PExpr::Plus(inner) => {
                if !self.eval(inner)? {
                    return Ok(false);
                }
                self.eval_repeat(inner)
            }

            PExpr::Lookahead(inner) => {
                let pos = self.pos;
                let matched = self.eval(inner)?;
                self.pos = pos;
                Ok(matched)
            }

            PExpr::Not(inner) => {
                let pos = self.pos;
                let matched = self.eval(inner)?;
                self.pos = pos;
                Ok(!matched)
            }

            PExpr::Param(index) => {
                let frame = self.frame();
                let arg = frame.args.get(*index).cloned().ok_or(MatchError::ParamOutOfRange {
                    index: *index,
                    arity: frame.args.len(),
                })?;
                self.eval(&arg)
            }

            PExpr::Apply { name, args } => self.apply(name, args),
        }
    }

    /// Greedy repetition. Stops on the first failed iteration, and also when
    /// a successful iteration leaves the cursor where it was, so an inner
    /// expression that matches the empty string cannot loop forever.
    fn eval_repeat(&mut self, inner: &Arc<PExpr>) -> Result<bool, MatchError> {
        loop {
            let before = self.pos;
            if !self.eval(inner)? || self.pos == before {
                return Ok(true);
            }
        }
    }

    fn eat_if(&mut self, predicate: impl FnOnce(char) -> bool) -> bool {
        match self.input[self.pos..].chars().next() {
            Some(c) if predicate(c) => {
                self.pos += c.len_utf8();
                true
            }
            _ => false,
        }
    }

    /// The rule-application protocol: memo probe, parameter substitution,
    /// frame push, body resolution along the grammar chain, evaluation, frame
    /// pop, memo record.
    ///
    /// Applications with arguments are not memoized: the memo key carries no
    /// argument fingerprint, so two differently-parameterized applications at
    /// one position would otherwise share a cell.
    fn apply(&mut self, name: &Arc<str>, args: &[Arc<PExpr>]) -> Result<bool, MatchError> {
        let entry = self.pos;

        if args.is_empty() {
            if let Some(memoized) = self.memo.get(&(name.clone(), entry)) {
                return Ok(match *memoized {
                    MemoEntry::Matched(end) => {
                        if cfg!(feature = "trace") {
                            println!("[OHM_TRACE] Cached match of rule `{}` at {}", name, entry);
                        }
                        self.pos = end;
                        true
                    }
                    MemoEntry::Failed => {
                        if cfg!(feature = "trace") {
                            println!("[OHM_TRACE] Cached fail of rule `{}` at {}", name, entry);
                        }
                        false
                    }
                });
            }
        }

        let lexical = rule_lexicality(name)?;

        let substituted = {
            let caller = self.frame();
            args.iter()
                .map(|arg| substitute(arg, &caller.args))
                .collect::<Result<Vec<_>, _>>()?
        };

        if cfg!(feature = "trace") {
            println!("[OHM_TRACE] Attempting to match rule `{}` at {}", name, entry);
        }

        self.stack.push(CallFrame {
            args: substituted,
            pos: entry,
            lexical,
        });
        let result = self.eval_rule_body(name);
        let frame = self.stack.pop().expect("the frame pushed above is still on the stack");
        let matched = result?;

        if args.is_empty() {
            let outcome = if matched {
                MemoEntry::Matched(self.pos)
            } else {
                MemoEntry::Failed
            };
            self.memo.insert((name.clone(), frame.pos), outcome);
        }

        if cfg!(feature = "trace") {
            if matched {
                println!(
                    "[OHM_TRACE] Matched rule `{}` at {} to {}",
                    name, frame.pos, self.pos
                );
            } else {
                println!("[OHM_TRACE] Failed to match rule `{}` at {}", name, frame.pos);
            }
        }

        Ok(matched)
    }

    fn eval_rule_body(&mut self, name: &str) -> Result<bool, MatchError> {
        let body = match self.grammar.rule(name) {
            Some(body) => body.clone(),
            None => return Err(MatchError::UnknownRule(name.to_string())),
        };
        self.eval(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::built_in_rules;

    fn grammar(rules: Vec<(&str, Arc<PExpr>)>) -> Grammar {
        Grammar::new(rules, Some(built_in_rules()))
    }

    #[test]
    fn cursor_is_restored_on_failure() {
        let g = grammar(vec![("start", PExpr::terminal("abc"))]);
        let mut state = MatchState::new(&g, "abx", true);
        assert_eq!(state.eval(&PExpr::apply("start")), Ok(false));
        assert_eq!(state.pos, 0);
    }

    #[test]
    fn unparameterized_applications_are_memoized() {
        let g = grammar(vec![("start", PExpr::terminal("ab"))]);
        let mut state = MatchState::new(&g, "ab", true);
        assert_eq!(state.eval(&PExpr::apply("start")), Ok(true));
        assert!(matches!(
            state.memo.get(&(Arc::from("start"), 0)),
            Some(MemoEntry::Matched(2))
        ));
    }

    #[test]
    fn parameterized_applications_are_not_memoized() {
        let g = grammar(vec![("twice", PExpr::seq(vec![PExpr::param(0), PExpr::param(0)]))]);
        let mut state = MatchState::new(&g, "aa", true);
        let app = PExpr::apply_with_args("twice", vec![PExpr::char('a')]);
        assert_eq!(state.eval(&app), Ok(true));
        assert!(state.memo.get(&(Arc::from("twice"), 0)).is_none());
    }

    #[test]
    fn memo_failure_entries_are_recorded_at_entry_position() {
        let g = grammar(vec![("start", PExpr::terminal("zz"))]);
        let mut state = MatchState::new(&g, "za", true);
        assert_eq!(state.eval(&PExpr::apply("start")), Ok(false));
        assert!(matches!(
            state.memo.get(&(Arc::from("start"), 0)),
            Some(MemoEntry::Failed)
        ));
        assert_eq!(state.pos, 0);
    }

    #[test]
    fn repetition_stops_at_an_empty_match() {
        let g = grammar(vec![("start", PExpr::star(PExpr::seq(vec![])))]);
        assert_eq!(g.matches_rule("start", ""), Ok(true));
    }

    #[test]
    fn structural_errors_escape_choice_and_negation() {
        let g = grammar(vec![(
            "start",
            PExpr::alt(vec![
                PExpr::not(PExpr::apply("missing")),
                PExpr::terminal("a"),
            ]),
        )]);
        assert_eq!(
            g.matches_rule("start", "a"),
            Err(MatchError::UnknownRule("missing".into()))
        );
    }

    #[test]
    fn lexicality_is_derived_from_the_first_code_point() {
        assert_eq!(rule_lexicality("ident"), Ok(true));
        assert_eq!(rule_lexicality("Expr"), Ok(false));
        assert_eq!(
            rule_lexicality("_x"),
            Err(MatchError::BadRuleName("_x".into()))
        );
        assert_eq!(rule_lexicality(""), Err(MatchError::BadRuleName("".into())));
    }
}
