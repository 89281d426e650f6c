use ohm::{ohm_grammar, OHM_GRAMMAR_SOURCE};

#[test]
fn no_grammars() {
    let g = ohm_grammar();
    assert_eq!(g.matches_rule("Grammars", ""), Ok(true));
    assert_eq!(g.matches_rule("Grammars", "\n\t"), Ok(true));
}

#[test]
fn empty_grammar() {
    let g = ohm_grammar();
    assert_eq!(g.matches_rule("Grammars", "G1 {}"), Ok(true));
    assert_eq!(g.matches_rule("Grammars", "\n\tG1 {\n\t}\n"), Ok(true));
    assert_eq!(g.matches_rule("Grammars", "G1 {"), Ok(false));
    assert_eq!(g.matches_rule("Grammars", "G1"), Ok(false));
    assert_eq!(g.matches_rule("Grammars", "1G {}"), Ok(false));
}

#[test]
fn simple_grammar() {
    let g = ohm_grammar();
    let source = r#"
        Arith {
          Exp = Term ("+" Term)*
          Term = digit+
        }
    "#;
    assert_eq!(g.matches_rule("Grammars", source), Ok(true));
}

#[test]
fn several_grammars_in_one_source() {
    let g = ohm_grammar();
    let source = r#"
        A { x = "1" }
        B <: A { y = x x }
    "#;
    assert_eq!(g.matches_rule("Grammars", source), Ok(true));
}

#[test]
fn full_feature_grammar() {
    let g = ohm_grammar();
    let source = r#"
        G <: Base {
          Start = ListOf<item, ","> -- list
          item (an item) = letter+ | "\u{1F600}"  // a lexical alternative
          keyword := "while" ~alnum
          range = "a".."z" | "\x30".."\x39"
          opt = range? &keyword
          space += "\x0B"
        }
    "#;
    assert_eq!(g.matches_rule("Grammars", source), Ok(true));
}

#[test]
fn comments_are_whitespace() {
    let g = ohm_grammar();
    let source = "// leading\nG { /* rule follows */ x = \"1\" // trailing\n }";
    assert_eq!(g.matches_rule("Grammars", source), Ok(true));
    assert_eq!(g.matches_rule("Grammars", "G { /* unclosed } "), Ok(false));
}

#[test]
fn lexical_fragments() {
    let g = ohm_grammar();

    assert_eq!(g.matches_rule("ident", "foo_bar1"), Ok(true));
    assert_eq!(g.matches_rule("ident", "_x"), Ok(true));
    assert_eq!(g.matches_rule("ident", "1foo"), Ok(false));

    assert_eq!(g.matches_rule("caseName", "-- foo\n"), Ok(true));
    assert_eq!(g.matches_rule("caseName", "-- foo"), Ok(false));

    assert_eq!(g.matches_rule("comment", "// to end of input"), Ok(true));
    assert_eq!(g.matches_rule("comment", "/* block */"), Ok(true));
    assert_eq!(g.matches_rule("comment", "/* unclosed"), Ok(false));

    assert_eq!(g.matches_rule("ruleDescr", "(a description)"), Ok(true));

    assert_eq!(g.matches_rule("operator", ":="), Ok(true));
    assert_eq!(g.matches_rule("operator", "+="), Ok(true));
    assert_eq!(g.matches_rule("operator", "@"), Ok(false));
}

#[test]
fn token_rules_lex_grammar_source() {
    let g = ohm_grammar();

    // A whole parameter list is one token: the lexical `token` rule crosses
    // into the syntactic `Params` rule through `applySyntactic`.
    assert_eq!(g.matches_rule("token", r#"<Seq, ",">"#), Ok(true));
    assert_eq!(g.matches_rule("token", "<Seq, \"|\" Iter>"), Ok(true));
    // An unclosed parameter list falls back to a single "<" punctuation
    // token, leaving the rest unconsumed.
    assert_eq!(g.matches_rule("token", "<x"), Ok(false));

    assert_eq!(
        g.matches_rule("tokens", "Rule := ListOf<x, \",\"> -- label\n"),
        Ok(true)
    );
}

#[test]
fn terminals_and_escapes() {
    let g = ohm_grammar();

    assert_eq!(g.matches_rule("terminal", r#""abc""#), Ok(true));
    assert_eq!(g.matches_rule("terminal", r#""""#), Ok(true));
    assert_eq!(g.matches_rule("terminal", r#""a\nb""#), Ok(true));
    assert_eq!(g.matches_rule("terminal", r#""abc"#), Ok(false));
    assert_eq!(g.matches_rule("terminal", "\"a\nb\""), Ok(false));

    assert_eq!(g.matches_rule("oneCharTerminal", r#""a""#), Ok(true));
    assert_eq!(g.matches_rule("oneCharTerminal", r#""ab""#), Ok(false));

    for escape in [r"\\", r"\'", r#"\""#, r"\b", r"\n", r"\r", r"\t"] {
        assert_eq!(g.matches_rule("escapeChar", escape), Ok(true), "{}", escape);
    }
    assert_eq!(g.matches_rule("escapeChar", r"\u{41}"), Ok(true));
    assert_eq!(g.matches_rule("escapeChar", r"\u{10FFFF}"), Ok(true));
    assert_eq!(g.matches_rule("escapeChar", r"\uBEEF"), Ok(true));
    assert_eq!(g.matches_rule("escapeChar", r"\xFF"), Ok(true));
    assert_eq!(g.matches_rule("escapeChar", r"\q"), Ok(false));
    assert_eq!(g.matches_rule("escapeChar", r"\u{}"), Ok(false));
}

// The engine's largest self-test: the meta-grammar accepts its own source.
#[test]
fn the_ohm_grammar_matches_itself() {
    let g = ohm_grammar();
    assert_eq!(g.matches_rule("Grammars", OHM_GRAMMAR_SOURCE), Ok(true));
}
