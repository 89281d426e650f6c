//! The bootstrap meta-grammar: a description of the Ohm grammar source
//! language, expressed as an ordinary [`Grammar`] over the same expression
//! algebra it describes.
//!
//! [`OHM_GRAMMAR_SOURCE`] holds the meta-grammar's own textual form, and
//! `ohm_grammar().matches_rule("Grammars", OHM_GRAMMAR_SOURCE)` holds — the
//! engine's largest self-test.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::builtins::built_in_rules;
use crate::expr::PExpr;
use crate::grammar::Grammar;

/// The Ohm grammar of Ohm grammars, in its own source language.
pub static OHM_GRAMMAR_SOURCE: &str = r#"
// Ohm grammars, described in their own pattern language.
Ohm {

  Grammars = Grammar*

  Grammar = ident SuperGrammar? "{" Rule* "}"

  SuperGrammar = "<:" ident

  Rule
    = ident Formals? ruleDescr? "=" RuleBody   -- define
    | ident Formals? ":=" OverrideRuleBody     -- override
    | ident Formals? "+=" RuleBody             -- extend

  RuleBody = "|"? NonemptyListOf<TopLevelTerm, "|">

  TopLevelTerm
    = Seq caseName   -- inline
    | Seq

  OverrideRuleBody = "|"? NonemptyListOf<OverrideTopLevelTerm, "|">

  OverrideTopLevelTerm
    = "..."   -- superSplice
    | TopLevelTerm

  Formals = "<" ListOf<ident, ","> ">"

  Params = "<" ListOf<Seq, ","> ">"

  Alt = NonemptyListOf<Seq, "|">

  Seq = Iter*

  Iter
    = Pred "*"   -- star
    | Pred "+"   -- plus
    | Pred "?"   -- opt
    | Pred

  Pred
    = "~" Base   -- not
    | "&" Base   -- lookahead
    | Base

  Base
    = ident Params? ~(ruleDescr? "=" | ":=" | "+=")   -- application
    | oneCharTerminal ".." oneCharTerminal            -- range
    | terminal                                        -- terminal
    | "(" Alt ")"                                     -- paren

  ruleDescr (a rule description) = "(" ruleDescrText ")"

  ruleDescrText = (~")" any)*

  /* Case labels and comments are significant to their line, so the
     rules that recognize them are lexical. */

  caseName = "--" (~"\n" space)* name (~"\n" space)* ("\n" | &"}")

  name (a name) = nameFirst nameRest*

  nameFirst
    = "_"
    | letter

  nameRest
    = "_"
    | alnum

  ident (an identifier) = name

  terminal = "\"" terminalChar* "\""

  oneCharTerminal = "\"" terminalChar "\""

  terminalChar
    = escapeChar
    | ~"\\" ~"\"" ~"\n" "\u{0}".."\u{10FFFF}"

  escapeChar (an escape sequence)
    = "\\\\"   -- backslash
    | "\\\""   -- doubleQuote
    | "\\\'"   -- singleQuote
    | "\\b"    -- backspace
    | "\\n"    -- lineFeed
    | "\\r"    -- carriageReturn
    | "\\t"    -- tab
    | "\\u{" hexDigit hexDigit? hexDigit? hexDigit? hexDigit? hexDigit? "}"   -- unicodeCodePoint
    | "\\u" hexDigit hexDigit hexDigit hexDigit   -- unicodeEscape
    | "\\x" hexDigit hexDigit                     -- hexEscape

  space += comment

  comment
    = "//" (~"\n" any)* &("\n" | end)   -- singleLine
    | "/*" (~"*/" any)* "*/"            -- multiLine

  tokens = token*

  token = caseName | comment | ident | operator | applySyntactic<Params> | punctuation | terminal | any

  operator = "<:" | "=" | ":=" | "+=" | "*" | "+" | "?" | "~" | "&"

  punctuation = "<" | ">" | "," | "--"
}
"#;

static OHM_GRAMMAR: Lazy<Arc<Grammar>> = Lazy::new(|| Arc::new(build_ohm_grammar()));

/// The grammar described by [`OHM_GRAMMAR_SOURCE`], as a `Grammar` instance
/// extending [`built_in_rules`](crate::built_in_rules).
pub fn ohm_grammar() -> Arc<Grammar> {
    OHM_GRAMMAR.clone()
}

fn t(s: &str) -> Arc<PExpr> {
    PExpr::terminal(s)
}

fn app(name: &str) -> Arc<PExpr> {
    PExpr::apply(name)
}

fn seq(children: Vec<Arc<PExpr>>) -> Arc<PExpr> {
    PExpr::seq(children)
}

fn alt(alternatives: Vec<Arc<PExpr>>) -> Arc<PExpr> {
    PExpr::alt(alternatives)
}

fn star(inner: Arc<PExpr>) -> Arc<PExpr> {
    PExpr::star(inner)
}

fn maybe(inner: Arc<PExpr>) -> Arc<PExpr> {
    PExpr::maybe(inner)
}

fn not(inner: Arc<PExpr>) -> Arc<PExpr> {
    PExpr::not(inner)
}

fn lookahead(inner: Arc<PExpr>) -> Arc<PExpr> {
    PExpr::lookahead(inner)
}

/// `NonemptyListOf<elem, "|">`, the backbone of rule bodies.
fn alternation_of(elem: &str) -> Arc<PExpr> {
    PExpr::apply_with_args("NonemptyListOf", vec![app(elem), t("|")])
}

fn build_ohm_grammar() -> Grammar {
    // `ident Formals?`, shared by the three Rule cases.
    let rule_head = || vec![app("ident"), maybe(app("Formals"))];

    // `~(ruleDescr? "=" | ":=" | "+=")`: an identifier followed by the start
    // of a rule definition belongs to the next rule, not to this body.
    let not_a_definition = not(alt(vec![
        seq(vec![maybe(app("ruleDescr")), t("=")]),
        t(":="),
        t("+="),
    ]));

    // `(~"\n" space)*`: same-line whitespace around a case label.
    let inline_space = star(seq(vec![not(t("\n")), app("space")]));

    let rules = vec![
        ("Grammars", star(app("Grammar"))),
        (
            "Grammar",
            seq(vec![
                app("ident"),
                maybe(app("SuperGrammar")),
                t("{"),
                star(app("Rule")),
                t("}"),
            ]),
        ),
        ("SuperGrammar", seq(vec![t("<:"), app("ident")])),
        (
            "Rule",
            alt(vec![
                seq(
                    rule_head()
                        .into_iter()
                        .chain([maybe(app("ruleDescr")), t("="), app("RuleBody")])
                        .collect(),
                ),
                seq(
                    rule_head()
                        .into_iter()
                        .chain([t(":="), app("OverrideRuleBody")])
                        .collect(),
                ),
                seq(
                    rule_head()
                        .into_iter()
                        .chain([t("+="), app("RuleBody")])
                        .collect(),
                ),
            ]),
        ),
        (
            "RuleBody",
            seq(vec![maybe(t("|")), alternation_of("TopLevelTerm")]),
        ),
        (
            "TopLevelTerm",
            alt(vec![seq(vec![app("Seq"), app("caseName")]), app("Seq")]),
        ),
        (
            "OverrideRuleBody",
            seq(vec![maybe(t("|")), alternation_of("OverrideTopLevelTerm")]),
        ),
        (
            "OverrideTopLevelTerm",
            alt(vec![t("..."), app("TopLevelTerm")]),
        ),
        (
            "Formals",
            seq(vec![
                t("<"),
                PExpr::apply_with_args("ListOf", vec![app("ident"), t(",")]),
                t(">"),
            ]),
        ),
        (
            "Params",
            seq(vec![
                t("<"),
                PExpr::apply_with_args("ListOf", vec![app("Seq"), t(",")]),
                t(">"),
            ]),
        ),
        ("Alt", alternation_of("Seq")),
        ("Seq", star(app("Iter"))),
        (
            "Iter",
            alt(vec![
                seq(vec![app("Pred"), t("*")]),
                seq(vec![app("Pred"), t("+")]),
                seq(vec![app("Pred"), t("?")]),
                app("Pred"),
            ]),
        ),
        (
            "Pred",
            alt(vec![
                seq(vec![t("~"), app("Base")]),
                seq(vec![t("&"), app("Base")]),
                app("Base"),
            ]),
        ),
        (
            "Base",
            alt(vec![
                seq(vec![app("ident"), maybe(app("Params")), not_a_definition]),
                seq(vec![
                    app("oneCharTerminal"),
                    t(".."),
                    app("oneCharTerminal"),
                ]),
                app("terminal"),
                seq(vec![t("("), app("Alt"), t(")")]),
            ]),
        ),
        (
            "ruleDescr",
            seq(vec![t("("), app("ruleDescrText"), t(")")]),
        ),
        ("ruleDescrText", star(seq(vec![not(t(")")), app("any")]))),
        (
            "caseName",
            seq(vec![
                t("--"),
                inline_space.clone(),
                app("name"),
                inline_space,
                alt(vec![t("\n"), lookahead(t("}"))]),
            ]),
        ),
        (
            "name",
            seq(vec![app("nameFirst"), star(app("nameRest"))]),
        ),
        ("nameFirst", alt(vec![t("_"), app("letter")])),
        ("nameRest", alt(vec![t("_"), app("alnum")])),
        ("ident", app("name")),
        (
            "terminal",
            seq(vec![t("\""), star(app("terminalChar")), t("\"")]),
        ),
        (
            "oneCharTerminal",
            seq(vec![t("\""), app("terminalChar"), t("\"")]),
        ),
        (
            "terminalChar",
            alt(vec![
                app("escapeChar"),
                seq(vec![
                    not(t("\\")),
                    not(t("\"")),
                    not(t("\n")),
                    PExpr::range('\u{0}', '\u{10FFFF}'),
                ]),
            ]),
        ),
        (
            "escapeChar",
            alt(vec![
                t("\\\\"),
                t("\\\""),
                t("\\'"),
                t("\\b"),
                t("\\n"),
                t("\\r"),
                t("\\t"),
                seq(vec![
                    t("\\u{"),
                    app("hexDigit"),
                    maybe(app("hexDigit")),
                    maybe(app("hexDigit")),
                    maybe(app("hexDigit")),
                    maybe(app("hexDigit")),
                    maybe(app("hexDigit")),
                    t("}"),
                ]),
                seq(vec![
                    t("\\u"),
                    app("hexDigit"),
                    app("hexDigit"),
                    app("hexDigit"),
                    app("hexDigit"),
                ]),
                seq(vec![t("\\x"), app("hexDigit"), app("hexDigit")]),
            ]),
        ),
        // `space += comment`, flattened over the built-in body.
        ("space", alt(vec![PExpr::chars(" \t\n\r"), app("comment")])),
        (
            "comment",
            alt(vec![
                seq(vec![
                    t("//"),
                    star(seq(vec![not(t("\n")), app("any")])),
                    lookahead(alt(vec![t("\n"), app("end")])),
                ]),
                seq(vec![
                    t("/*"),
                    star(seq(vec![not(t("*/")), app("any")])),
                    t("*/"),
                ]),
            ]),
        ),
        ("tokens", star(app("token"))),
        (
            "token",
            alt(vec![
                app("caseName"),
                app("comment"),
                app("ident"),
                app("operator"),
                // A parameter list is syntactic; the lexical token rule
                // reaches it through applySyntactic.
                PExpr::apply_with_args("applySyntactic", vec![app("Params")]),
                app("punctuation"),
                app("terminal"),
                app("any"),
            ]),
        ),
        (
            "operator",
            alt(vec![
                t("<:"),
                t("="),
                t(":="),
                t("+="),
                t("*"),
                t("+"),
                t("?"),
                t("~"),
                t("&"),
            ]),
        ),
        (
            "punctuation",
            alt(vec![t("<"), t(">"), t(","), t("--")]),
        ),
    ];

    Grammar::new(rules, Some(built_in_rules()))
}
