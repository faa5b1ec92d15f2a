//! Integration tests for end-to-end grammar execution workflows

use pegcore::engine::{parse, parse_with, ParseOptions};
use pegcore::grammar::{GrammarBuilder, RuleExpr};
use pegcore::testing::{verify_rule, Expectation};
use pegcore::{ActionTable, FnScope, Grammar, RuleId, StateChain, TrackingMode};

/// A four-operation calculator: actions evaluate onto a value stack held
/// in the state chain.
fn calculator() -> (Grammar, RuleId, ActionTable) {
    let mut builder = GrammarBuilder::new();
    let expr = builder.declare("expr");

    let number = builder.rule("number", RuleExpr::plus(RuleExpr::byte_range(b'0', b'9')));
    let factor = builder.rule(
        "factor",
        RuleExpr::choice([
            RuleExpr::rule(number),
            RuleExpr::seq([
                RuleExpr::literal("("),
                RuleExpr::rule(expr),
                RuleExpr::literal(")"),
            ]),
        ]),
    );
    let mul = builder.rule(
        "mul",
        RuleExpr::seq([RuleExpr::literal("*"), RuleExpr::rule(factor)]),
    );
    let div = builder.rule(
        "div",
        RuleExpr::seq([RuleExpr::literal("/"), RuleExpr::rule(factor)]),
    );
    let term = builder.rule(
        "term",
        RuleExpr::seq([
            RuleExpr::rule(factor),
            RuleExpr::star(RuleExpr::choice([RuleExpr::rule(mul), RuleExpr::rule(div)])),
        ]),
    );
    let add = builder.rule(
        "add",
        RuleExpr::seq([RuleExpr::literal("+"), RuleExpr::rule(term)]),
    );
    let sub = builder.rule(
        "sub",
        RuleExpr::seq([RuleExpr::literal("-"), RuleExpr::rule(term)]),
    );
    builder
        .define(
            expr,
            RuleExpr::seq([
                RuleExpr::rule(term),
                RuleExpr::star(RuleExpr::choice([RuleExpr::rule(add), RuleExpr::rule(sub)])),
            ]),
        )
        .unwrap();
    let grammar = builder.build().unwrap();

    fn pop2(stack: &mut Vec<i64>) -> (i64, i64) {
        let b = stack.pop().unwrap_or(0);
        let a = stack.pop().unwrap_or(0);
        (a, b)
    }

    let mut actions = ActionTable::new();
    actions.apply(number, |span, states| {
        let value: i64 = span.as_str().unwrap().parse().unwrap();
        if let Some(stack) = states.last_mut::<Vec<i64>>() {
            stack.push(value);
        }
    });
    actions.apply0(add, |states| {
        if let Some(stack) = states.last_mut::<Vec<i64>>() {
            let (a, b) = pop2(stack);
            stack.push(a + b);
        }
    });
    actions.apply0(sub, |states| {
        if let Some(stack) = states.last_mut::<Vec<i64>>() {
            let (a, b) = pop2(stack);
            stack.push(a - b);
        }
    });
    actions.apply0(mul, |states| {
        if let Some(stack) = states.last_mut::<Vec<i64>>() {
            let (a, b) = pop2(stack);
            stack.push(a * b);
        }
    });
    actions.apply0(div, |states| {
        if let Some(stack) = states.last_mut::<Vec<i64>>() {
            let (a, b) = pop2(stack);
            stack.push(a / b);
        }
    });

    (grammar, expr, actions)
}

fn eval(input: &str) -> i64 {
    let (grammar, expr, actions) = calculator();
    let mut states = StateChain::with(Vec::<i64>::new());
    let report = parse(&grammar, expr, input.as_bytes(), &actions, &mut states).unwrap();
    assert!(report.matched, "'{input}' should parse");
    assert_eq!(report.remaining, 0, "'{input}' should be fully consumed");
    let stack = states.pop::<Vec<i64>>().unwrap();
    assert_eq!(stack.len(), 1, "'{input}' should leave one value");
    stack[0]
}

#[test]
fn test_calculator_precedence_and_grouping() {
    assert_eq!(eval("42"), 42);
    assert_eq!(eval("2+3*4"), 14);
    assert_eq!(eval("(2+3)*4"), 20);
    assert_eq!(eval("10-3-2"), 5);
    assert_eq!(eval("100/5/2"), 10);
    assert_eq!(eval("1+2*(3+4)-5"), 10);
}

#[test]
fn test_calculator_structural_pass_leaves_state_untouched() {
    let (grammar, expr, actions) = calculator();
    let mut states = StateChain::with(Vec::<i64>::new());
    let options = ParseOptions {
        actions_enabled: false,
        ..ParseOptions::default()
    };
    let report =
        parse_with(&grammar, expr, b"2+3*4", &actions, &mut states, &options).unwrap();
    assert!(report.matched);
    assert_eq!(report.remaining, 0);
    assert!(states.last::<Vec<i64>>().unwrap().is_empty());
}

#[test]
fn test_calculator_partial_match_reports_remainder() {
    let (grammar, expr, actions) = calculator();
    let mut states = StateChain::with(Vec::<i64>::new());
    let report = parse(&grammar, expr, b"1+2;rest", &actions, &mut states).unwrap();
    assert!(report.matched);
    assert_eq!(report.offset, 3);
    assert_eq!(report.remaining, 5);
}

/// Key-value lines where a key followed by '=' commits: anything but a
/// well-formed value is a hard syntax error, not a backtrack.
fn config_grammar() -> (Grammar, RuleId) {
    let mut builder = GrammarBuilder::new();
    let key = builder.rule("key", RuleExpr::plus(RuleExpr::byte_range(b'a', b'z')));
    let value = builder.rule(
        "value",
        RuleExpr::plus(RuleExpr::choice([
            RuleExpr::byte_range(b'a', b'z'),
            RuleExpr::byte_range(b'0', b'9'),
        ])),
    );
    let pair = builder.rule(
        "pair",
        RuleExpr::seq([
            RuleExpr::rule(key),
            RuleExpr::literal("="),
            RuleExpr::must(RuleExpr::rule(value)),
        ]),
    );
    let file = builder.rule(
        "file",
        RuleExpr::seq([
            RuleExpr::rule(pair),
            RuleExpr::star(RuleExpr::seq([
                RuleExpr::literal("\n"),
                RuleExpr::rule(pair),
            ])),
            RuleExpr::eof(),
        ]),
    );
    (builder.build().unwrap(), file)
}

#[test]
fn test_config_accepts_and_rejects() {
    let (grammar, file) = config_grammar();
    verify_rule(&grammar, file, b"host=example\nport=8080", Expectation::Success, 0);
    // No '=' after the key: ordinary local failure, nothing consumed.
    verify_rule(&grammar, file, b"host example", Expectation::LocalFailure, 12);
}

#[test]
fn test_config_missing_value_is_fatal() {
    let (grammar, file) = config_grammar();
    let mut states = StateChain::new();
    let err = parse(&grammar, file, b"host=\nport=1", &ActionTable::new(), &mut states)
        .unwrap_err();
    assert_eq!(err.rule, "pair");
    assert_eq!(err.offset(), 5);
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 6);
}

#[test]
fn test_config_fatal_position_on_later_line() {
    let (grammar, file) = config_grammar();
    let mut states = StateChain::new();
    let err = parse(&grammar, file, b"a=1\nb=\n", &ActionTable::new(), &mut states)
        .unwrap_err();
    assert_eq!(err.position.line, 2);
    assert_eq!(err.position.column, 3);
}

#[test]
fn test_crlf_counts_as_one_terminator() {
    let mut builder = GrammarBuilder::new();
    let all = builder.rule("all", RuleExpr::star(RuleExpr::any_byte()));
    let grammar = builder.build().unwrap();
    let mut states = StateChain::new();
    let report = parse(&grammar, all, b"ab\r\ncd", &ActionTable::new(), &mut states).unwrap();
    assert_eq!(report.position.line, 2);
    assert_eq!(report.position.column, 3);

    // Lazy tracking resolves the same final position.
    let options = ParseOptions {
        tracking: TrackingMode::Lazy,
        ..ParseOptions::default()
    };
    let mut states = StateChain::new();
    let lazy =
        parse_with(&grammar, all, b"ab\r\ncd", &ActionTable::new(), &mut states, &options)
            .unwrap();
    assert_eq!(lazy.position, report.position);
}

#[test]
fn test_disabled_subtree_runs_zero_actions() {
    let mut builder = GrammarBuilder::new();
    let item = builder.rule("item", RuleExpr::byte_range(b'a', b'z'));
    let body = builder.rule("body", RuleExpr::plus(RuleExpr::rule(item)));
    let start = builder.rule("start", RuleExpr::disable(RuleExpr::rule(body)));
    let grammar = builder.build().unwrap();

    let mut actions = ActionTable::new();
    actions.apply0(item, |states| {
        if let Some(n) = states.last_mut::<u32>() {
            *n += 1;
        }
    });
    actions.apply0(body, |states| {
        if let Some(n) = states.last_mut::<u32>() {
            *n += 100;
        }
    });

    let mut states = StateChain::with(0u32);
    let report = parse(&grammar, start, b"abc", &actions, &mut states).unwrap();
    assert!(report.matched);
    assert_eq!(report.offset, 3);
    assert_eq!(states.last::<u32>(), Some(&0));
}

#[test]
fn test_scoped_accumulator_folds_per_group() {
    // Each parenthesized group collects its letters in a scoped buffer;
    // only complete groups fold into the output.
    let mut builder = GrammarBuilder::new();
    let letter = builder.rule("letter", RuleExpr::byte_range(b'a', b'z'));
    let group_body = RuleExpr::seq([
        RuleExpr::literal("("),
        RuleExpr::star(RuleExpr::rule(letter)),
        RuleExpr::literal(")"),
    ]);
    let group = builder.rule(
        "group",
        RuleExpr::scope(
            FnScope::new(
                |_: &pegcore::Cursor<'_>, _: &StateChain| String::new(),
                |_: &pegcore::Cursor<'_>, buf: String, states: &mut StateChain| {
                    if let Some(out) = states.find_mut::<Vec<String>>() {
                        out.push(buf);
                    }
                },
            ),
            group_body,
        ),
    );
    let start = builder.rule(
        "start",
        RuleExpr::star(RuleExpr::choice([
            RuleExpr::rule(group),
            RuleExpr::any_byte(),
        ])),
    );
    let grammar = builder.build().unwrap();

    let mut actions = ActionTable::new();
    actions.apply(letter, |span, states| {
        if let Some(buf) = states.last_mut::<String>() {
            buf.push_str(span.as_str().unwrap());
        }
    });

    let mut states = StateChain::with(Vec::<String>::new());
    let report = parse(&grammar, start, b"(ab) x (cd", &actions, &mut states).unwrap();
    assert!(report.matched);
    assert_eq!(states.len(), 1);
    // "(cd" never closed, so its scoped buffer was discarded.
    assert_eq!(states.last::<Vec<String>>().unwrap(), &vec!["ab".to_string()]);
}

#[test]
fn test_grammar_shared_across_threads() {
    let (grammar, expr, actions) = calculator();
    std::thread::scope(|scope| {
        for input in ["1+1", "6*7", "(8-2)*7"] {
            let grammar = &grammar;
            let actions = &actions;
            scope.spawn(move || {
                let mut states = StateChain::with(Vec::<i64>::new());
                let report = parse(grammar, expr, input.as_bytes(), actions, &mut states)
                    .unwrap();
                assert!(report.matched);
            });
        }
    });
}
