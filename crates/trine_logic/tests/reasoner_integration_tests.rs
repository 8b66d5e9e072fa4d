//! Integration tests for the reasoner
//!
//! Tests end-to-end inference through parsed rules, order independence of
//! the final store, agreement with a naive nested-loop join, and builtin
//! behaviour inside rule bodies.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use trine_graph::{parse_facts, Statement, Term};
use trine_logic::{BuiltinRegistry, Error, KnowledgeBase, Reasoner, Rule, RuleParser};

fn rules(text: &str) -> Vec<Rule> {
    let registry = BuiltinRegistry::standard();
    RuleParser::new(&registry).parse(text).unwrap()
}

fn facts(text: &str) -> Vec<Statement> {
    parse_facts(text).unwrap()
}

fn fact(s: &str, p: &str, o: &str) -> Statement {
    facts(&format!("{} {} {} .", s, p, o)).remove(0)
}

fn store_of(kb: &KnowledgeBase) -> HashSet<Statement> {
    kb.facts().cloned().collect()
}

// ============================================================================
// End-to-End Scenario
// ============================================================================

const MINOR_RULE: &str = r#"
    @minor { ?x <age> ?a . ?a lt "18" } => { ?x <status> "minor" } .
"#;

#[test]
fn test_age_status_scenario() {
    let notified = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&notified);
    let reasoner = Reasoner::new(rules(MINOR_RULE))
        .with_listener(move |f: &Statement| log.borrow_mut().push(f.clone()));
    let mut kb = KnowledgeBase::new(reasoner);

    let alice_age = fact("<alice>", "<age>", "\"17\"");
    let alice_minor = fact("<alice>", "<status>", "\"minor\"");

    assert!(kb.add(alice_age.clone()).unwrap());
    assert!(kb.contains(&alice_minor));
    assert_eq!(kb.len(), 2);

    assert!(kb.add(fact("<bob>", "<age>", "\"21\"")).unwrap());
    assert!(!kb.contains(&fact("<bob>", "<status>", "\"minor\"")));
    assert_eq!(kb.len(), 3);

    // Re-assertion: no duplicate, no second notification.
    assert!(!kb.add(alice_age).unwrap());
    assert_eq!(kb.len(), 3);
    assert_eq!(*notified.borrow(), vec![alice_minor]);
}

#[test]
fn test_numeric_comparison_in_rule() {
    // "3" < "18" numerically, though not lexically.
    let mut kb = KnowledgeBase::with_rules(rules(MINOR_RULE));
    kb.add(fact("<carl>", "<age>", "\"3\"")).unwrap();
    assert!(kb.contains(&fact("<carl>", "<status>", "\"minor\"")));
}

// ============================================================================
// Confluence
// ============================================================================

const FAMILY_RULES: &str = r#"
    @ancestor-base { ?x <parent> ?y } => { ?x <ancestor> ?y } .
    @ancestor-step { ?x <parent> ?y . ?y <ancestor> ?z } => { ?x <ancestor> ?z } .
    @related { ?x <ancestor> ?y } => { ?y <related> ?x . ?x <related> ?y } .
    @elder { ?x <ancestor> ?y . ?x <born> ?b . ?b lt "1950" } => { ?x <elder> ?y } .
"#;

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}

#[test]
fn test_final_store_is_order_independent() {
    let seeds = facts(
        r#"
        <ann> <parent> <bea> .
        <bea> <parent> <cid> .
        <cid> <parent> <dan> .
        <ann> <born> "1940" .
        <bea> <born> "1965" .
        "#,
    );

    let mut expected: Option<HashSet<Statement>> = None;
    for order in permutations(&seeds) {
        let mut kb = KnowledgeBase::with_rules(rules(FAMILY_RULES));
        kb.extend(order).unwrap();
        let result = store_of(&kb);
        match &expected {
            Some(first) => assert_eq!(&result, first),
            None => expected = Some(result),
        }
    }

    let expected = expected.unwrap();
    assert!(expected.contains(&fact("<ann>", "<ancestor>", "<dan>")));
    assert!(expected.contains(&fact("<dan>", "<related>", "<ann>")));
    assert!(expected.contains(&fact("<ann>", "<elder>", "<dan>")));
    assert!(!expected.contains(&fact("<bea>", "<elder>", "<dan>")));
}

#[test]
fn test_duplicate_seeds_do_not_change_result() {
    let seeds = facts("<a> <parent> <b> . <b> <parent> <c> .");
    let mut once = KnowledgeBase::with_rules(rules(FAMILY_RULES));
    once.extend(seeds.clone()).unwrap();

    let mut twice = KnowledgeBase::with_rules(rules(FAMILY_RULES));
    twice.extend(seeds.iter().cloned().chain(seeds.iter().cloned())).unwrap();

    assert_eq!(store_of(&once), store_of(&twice));
    assert_eq!(once.len(), twice.len());
}

// ============================================================================
// Backtracking Join vs. Nested-Loop Oracle
// ============================================================================

fn unify(pattern: &Statement, fact: &Statement, env: &mut HashMap<String, Term>) -> bool {
    for (p, f) in pattern.terms().into_iter().zip(fact.terms()) {
        match p {
            Term::Variable(var) => match env.get(var.name()) {
                Some(bound) if bound != f => return false,
                Some(_) => {}
                None => {
                    env.insert(var.name().to_string(), f.clone());
                }
            },
            Term::Constant(_) => {
                if p != f {
                    return false;
                }
            }
        }
    }
    true
}

fn substitute(head: &Statement, env: &HashMap<String, Term>) -> Statement {
    let sub = |t: &Term| match t {
        Term::Variable(var) => env.get(var.name()).cloned().unwrap_or_else(|| t.clone()),
        Term::Constant(_) => t.clone(),
    };
    Statement::new(sub(&head.subject), sub(&head.predicate), sub(&head.object))
}

fn nested_loop(
    body: &[Statement],
    head: &Statement,
    facts: &[Statement],
    env: HashMap<String, Term>,
    out: &mut HashSet<Statement>,
) {
    let Some((first, rest)) = body.split_first() else {
        out.insert(substitute(head, &env));
        return;
    };
    for f in facts {
        let mut branch = env.clone();
        if unify(first, f, &mut branch) {
            nested_loop(rest, head, facts, branch, out);
        }
    }
}

/// Deterministic pseudo-random graph over a handful of people.
fn generated_facts(seed: u64, count: usize) -> Vec<Statement> {
    let people = ["<p0>", "<p1>", "<p2>", "<p3>", "<p4>", "<p5>"];
    let preds = ["<knows>", "<likes>"];
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    let mut out = Vec::new();
    for _ in 0..count {
        let s = people[next() % people.len()];
        let p = preds[next() % preds.len()];
        let o = people[next() % people.len()];
        let f = fact(s, p, o);
        if !out.contains(&f) {
            out.push(f);
        }
    }
    out
}

#[test]
fn test_join_matches_nested_loop_oracle() {
    let text = r#"
        @triangle { ?a <knows> ?b . ?b <knows> ?c . ?c <likes> ?a } => { ?a <triangle> ?c } .
        @self { ?x <knows> ?x . ?x <likes> ?y } => { ?x <selfish> ?y } .
        @mutual { ?x <likes> ?y . ?y <likes> ?x } => { ?x <mutual> ?y } .
    "#;
    let parsed = rules(text);

    for seed in [1u64, 7, 42, 2024] {
        let seeds = generated_facts(seed, 30);
        let mut kb = KnowledgeBase::with_rules(parsed.clone());
        kb.extend(seeds.clone()).unwrap();
        let derived = store_of(&kb);

        for rule in &parsed {
            let body: Vec<Statement> = rule
                .body()
                .iter()
                .map(|c| c.as_pattern().unwrap().statement().clone())
                .collect();
            let head = &rule.head()[0];

            let mut expected = HashSet::new();
            nested_loop(&body, head, &seeds, HashMap::new(), &mut expected);

            let head_pred = &head.predicate;
            let actual: HashSet<Statement> = derived
                .iter()
                .filter(|f| &f.predicate == head_pred)
                .cloned()
                .collect();
            assert_eq!(actual, expected, "rule {} seed {}", rule.id(), seed);
        }
    }
}

// ============================================================================
// Builtins in Rule Bodies
// ============================================================================

#[test]
fn test_builtin_reading_unbound_variable_is_rejected() {
    let registry = BuiltinRegistry::standard();
    let parser = RuleParser::new(&registry);

    let never = parser.parse(r#"{ ?x <n> ?a . lt(?never, "5") } => { ?x <small> "yes" } ."#);
    assert!(matches!(never, Err(Error::InvalidRule(_))));

    // ?b is only bound by the pattern after the builtin.
    let late = parser.parse(r#"{ ?x <p> ?a . lt(?a, ?b) . ?x <q> ?b } => { ?x <r> "yes" } ."#);
    assert!(matches!(late, Err(Error::InvalidRule(_))));
}

#[test]
fn test_builtin_over_two_patterns_is_order_independent() {
    let text = r#"{ ?x <p> ?a . ?x <q> ?b . lt(?a, ?b) } => { ?x <r> "yes" } ."#;
    let p = fact("<x>", "<p>", "\"1\"");
    let q = fact("<x>", "<q>", "\"5\"");

    let mut p_first = KnowledgeBase::with_rules(rules(text));
    p_first.extend([p.clone(), q.clone()]).unwrap();
    let mut q_first = KnowledgeBase::with_rules(rules(text));
    q_first.extend([q, p]).unwrap();

    assert_eq!(store_of(&p_first), store_of(&q_first));
    assert!(p_first.contains(&fact("<x>", "<r>", "\"yes\"")));
}

#[test]
fn test_mutating_builtin_checks_bound_output() {
    let text = r#"
        { ?p <first> ?f . ?p <last> ?l . ?p <claims> ?n . concat(?f, ?l, ?n) } => { ?p <honest> "yes" } .
    "#;
    let mut kb = KnowledgeBase::with_rules(rules(text));
    kb.extend(facts(
        r#"
        <a> <first> "Ada" . <a> <last> "L" . <a> <claims> "AdaL" .
        <b> <first> "Bo" . <b> <last> "K" . <b> <claims> "Bob" .
        "#,
    ))
    .unwrap();

    assert!(kb.contains(&fact("<a>", "<honest>", "\"yes\"")));
    assert!(!kb.contains(&fact("<b>", "<honest>", "\"yes\"")));
}

#[test]
fn test_mutating_builtin_output_chains_into_inference() {
    let text = r#"
        @greet { ?p <name> ?n . concat("Hello, ", ?n, ?g) } => { ?p <greeting> ?g } .
        @loud { ?p <greeting> ?g . regex(?g, "^Hello") } => { ?p <friendly> "true" } .
    "#;
    let mut kb = KnowledgeBase::with_rules(rules(text));
    kb.add(fact("<x>", "<name>", "\"Ann\"")).unwrap();

    assert!(kb.contains(&fact("<x>", "<greeting>", "\"Hello, Ann\"")));
    assert!(kb.contains(&fact("<x>", "<friendly>", "\"true\"")));
}

#[test]
fn test_comparisons_over_literals() {
    let text = r#"
        { ?x <score> ?s . ?s ge "90" } => { ?x <grade> "A" } .
        { ?x <score> ?s . ?s lt "90" . ?s ge "80" } => { ?x <grade> "B" } .
        { ?x <score> ?s . ?s eq "100" } => { ?x <perfect> "true" } .
        { ?x <score> ?s . ?s ne "100" } => { ?x <perfect> "false" } .
    "#;
    let mut kb = KnowledgeBase::with_rules(rules(text));
    kb.extend(facts(r#"<a> <score> "100" . <b> <score> "85" . <c> <score> 9 ."#))
        .unwrap();

    assert!(kb.contains(&fact("<a>", "<grade>", "\"A\"")));
    assert!(kb.contains(&fact("<a>", "<perfect>", "\"true\"")));
    assert!(kb.contains(&fact("<b>", "<grade>", "\"B\"")));
    assert!(kb.contains(&fact("<b>", "<perfect>", "\"false\"")));
    // 9 is not >= 90 numerically, even though "9" > "90" lexically.
    assert!(!kb.contains(&fact("<c>", "<grade>", "\"A\"")));
}
