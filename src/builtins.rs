use std::sync::Arc;

use once_cell::sync::Lazy;
use unicode_general_category::GeneralCategory;

use crate::expr::{PExpr, UnicodeCategory};
use crate::grammar::Grammar;

static PRIMITIVE_RULES: Lazy<Arc<Grammar>> = Lazy::new(|| {
    Arc::new(Grammar::new(
        vec![
            ("any", PExpr::any()),
            ("lower", PExpr::unicode_category(UnicodeCategory::Lower)),
            ("upper", PExpr::unicode_category(UnicodeCategory::Upper)),
            (
                "unicodeLtmo",
                PExpr::unicode_category(UnicodeCategory::Categories(vec![
                    GeneralCategory::TitlecaseLetter,
                    GeneralCategory::ModifierLetter,
                    GeneralCategory::OtherLetter,
                ])),
            ),
        ],
        None,
    ))
});

static BUILT_IN_RULES: Lazy<Arc<Grammar>> = Lazy::new(|| {
    let elem = PExpr::param(0);
    let sep = PExpr::param(1);
    // elem (sep elem)*
    let nonempty_list = PExpr::seq(vec![
        elem.clone(),
        PExpr::star(PExpr::seq(vec![sep.clone(), elem.clone()])),
    ]);
    let forward = |name: &str| PExpr::apply_with_args(name, vec![elem.clone(), sep.clone()]);

    Arc::new(Grammar::new(
        vec![
            (
                "alnum",
                PExpr::alt(vec![PExpr::apply("letter"), PExpr::apply("digit")]),
            ),
            (
                "letter",
                PExpr::alt(vec![
                    PExpr::apply("lower"),
                    PExpr::apply("upper"),
                    PExpr::apply("unicodeLtmo"),
                ]),
            ),
            ("digit", PExpr::range('0', '9')),
            (
                "hexDigit",
                PExpr::alt(vec![
                    PExpr::apply("digit"),
                    PExpr::range('a', 'f'),
                    PExpr::range('A', 'F'),
                ]),
            ),
            ("end", PExpr::not(PExpr::any())),
            ("spaces", PExpr::star(PExpr::apply("space"))),
            ("space", PExpr::chars(" \t\n\r")),
            (
                "ListOf",
                PExpr::alt(vec![forward("NonemptyListOf"), forward("EmptyListOf")]),
            ),
            ("NonemptyListOf", nonempty_list.clone()),
            ("EmptyListOf", PExpr::seq(vec![])),
            (
                "listOf",
                PExpr::alt(vec![forward("nonemptyListOf"), forward("emptyListOf")]),
            ),
            ("nonemptyListOf", nonempty_list),
            ("emptyListOf", PExpr::seq(vec![])),
            // Identity on its argument. Lexical or syntactic evaluation of
            // the applied rule follows that rule's own name.
            ("applySyntactic", PExpr::param(0)),
        ],
        Some(primitive_rules()),
    ))
});

/// The primitive layer: `any`, `lower`, `upper`, and `unicodeLtmo`
/// (titlecase, modifier, and other letters).
pub fn primitive_rules() -> Arc<Grammar> {
    PRIMITIVE_RULES.clone()
}

/// The standard rules every user grammar is expected to inherit: character
/// classes, `end`, whitespace, and the list combinators. Extends
/// [`primitive_rules`].
pub fn built_in_rules() -> Arc<Grammar> {
    BUILT_IN_RULES.clone()
}
