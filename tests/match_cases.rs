use yql::{FieldValue, Record, matches};

fn record(pairs: Vec<(&str, FieldValue)>) -> Record {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn check(cases: Vec<(&str, Option<Record>, bool)>) {
    for (predicate, data, expected) in cases {
        let actual = matches(predicate, data.as_ref())
            .unwrap_or_else(|e| panic!("failed to parse {predicate:?}: {e}"));
        assert_eq!(actual, expected, "predicate={predicate} data={data:?}");
    }
}

#[test]
fn simple_comparisons() {
    check(vec![
        ("a=10", Some(record(vec![("a", 9i64.into())])), false),
        ("a=10", Some(record(vec![("a", 10.0.into())])), true),
        ("a!=10", Some(record(vec![("a", 10.0.into())])), false),
        ("a>10", Some(record(vec![("a", 10.0.into())])), false),
        ("a<10", Some(record(vec![("a", 10.0.into())])), false),
        ("a=10", Some(record(vec![("a", "10".into())])), true),
        ("a=10", Some(record(vec![("a", 10i64.into())])), true),
        ("a='10'", Some(record(vec![("a", 10i64.into())])), true),
        ("a=10", Some(record(vec![("c", 10i64.into())])), false),
        ("a=10", None, false),
        ("a!=10", Some(record(vec![("a", 10i64.into())])), false),
        ("a!=10", Some(record(vec![("a", 0i64.into())])), true),
        ("a<=10", Some(record(vec![("a", 10i64.into())])), true),
        ("a<=10", Some(record(vec![("a", 100i64.into())])), false),
        ("a>=10", Some(record(vec![("a", 10.0.into())])), true),
        ("a>=10", Some(record(vec![("a", 9.0.into())])), false),
        ("a<=10", Some(record(vec![("a", 9.0.into())])), true),
        ("a<=10", Some(record(vec![("a", 11.0.into())])), false),
        ("a<=10", Some(record(vec![("a", "0".into())])), true),
        ("a<=10", Some(record(vec![("a", "00".into())])), true),
        ("a!=10", Some(record(vec![("a", "0".into())])), true),
    ]);
}

#[test]
fn membership() {
    check(vec![
        ("a !in (1,2, 10,   5)", Some(record(vec![("a", 9i64.into())])), true),
        ("a !in (1,2, 10,   5)", Some(record(vec![("a", "9".into())])), true),
        (
            "a in (1,2, 10,   5)",
            Some(record(vec![("a", vec!["1", "5"].into())])),
            true,
        ),
        (
            "a !in (1,2, 10,   5)",
            Some(record(vec![("a", vec!["1", "5"].into())])),
            false,
        ),
        ("a !in (1,2, 10,   5)", Some(record(vec![("a", "1".into())])), false),
        (
            "a !in (1,2, 10,   5)",
            Some(record(vec![("a", vec!["1", "5", "3"].into())])),
            true,
        ),
        (
            "a in (1,2, 10,   5)",
            Some(record(vec![("a", vec![1i64, 5].into())])),
            true,
        ),
        (
            "a in (1,2, 10.000,   5.000)",
            Some(record(vec![(
                "a",
                vec![2.000000000000001, 5.000000000000000002].into(),
            )])),
            true,
        ),
        (
            "a in (1,2,3, 10.00000000001)",
            Some(record(vec![("a", 10.0.into())])),
            true,
        ),
        (
            "a !in (1,2,3, 10.00001)",
            Some(record(vec![("a", 10.0.into())])),
            true,
        ),
        (
            "a in (1,2, 10)",
            Some(record(vec![("a", vec![2i64, 3].into())])),
            false,
        ),
        ("a in (1,2,3, 10)", Some(record(vec![("a", 10i64.into())])), true),
        (
            "a in (1,2,3, 10)",
            Some(record(vec![("a", vec![2i64, 3].into())])),
            true,
        ),
        (
            "a in (1,2, 10,   5)",
            Some(record(vec![("a", vec![2.0, 5.0].into())])),
            true,
        ),
        (
            "a in (1,2, 10,   5)",
            Some(record(vec![("a", vec![1.0, 10.0, 2.0, 5.0].into())])),
            true,
        ),
        (
            "a in (1,2, 10,   5)",
            Some(record(vec![("a", vec![1.0, 10.0, 2.0, 5.0, 3.0].into())])),
            false,
        ),
    ]);
}

#[test]
fn conjunctions() {
    let full = record(vec![
        ("a", 10i64.into()),
        ("b", 3i64.into()),
        ("c", (-1i64).into()),
        ("d", 2i64.into()),
    ]);
    let without_d = record(vec![
        ("a", 10i64.into()),
        ("b", 3i64.into()),
        ("c", (-1i64).into()),
    ]);
    check(vec![
        ("a=10 and b>'2' and c<9 and d!=2", Some(full), false),
        ("a=10 and b>'2' and c<9 and d!=2", Some(without_d.clone()), false),
        ("a=10 and b>'2' and c<9", Some(without_d), true),
        (
            "a=10 and b>'2'",
            Some(record(vec![("a", 10i64.into()), ("b", 2i64.into())])),
            false,
        ),
        (
            "a=10 and b>'2' and c<9 and d!=2",
            Some(record(vec![
                ("a", 10i64.into()),
                ("b", 3i64.into()),
                ("c", (-1i64).into()),
                ("d", 0i64.into()),
            ])),
            true,
        ),
    ]);
}

#[test]
fn disjunctions_and_precedence() {
    let data = record(vec![
        ("a", 10i64.into()),
        ("b", 1i64.into()),
        ("c", 1i64.into()),
    ]);
    check(vec![
        ("a=9 or c=1 and b!='1'", Some(data.clone()), false),
        ("a=10 and b>'2' or c=1", Some(data.clone()), true),
        ("a=10 or c=1 and b!='1'", Some(data.clone()), true),
        ("a=10 and (c=1 or b!='1')", Some(data.clone()), true),
        ("a=11 or b>'2' or c<0", Some(data), false),
        (
            "a=10 and (c=1 or b!='1') and d='123'",
            Some(record(vec![
                ("a", 10i64.into()),
                ("b", 1i64.into()),
                ("c", 1i64.into()),
                ("d", "123".into()),
            ])),
            true,
        ),
    ]);
}

#[test]
fn intersection() {
    check(vec![
        (
            "letter !∩ (1,2,3)",
            Some(record(vec![("letter", vec![0.5, 3.01].into())])),
            true,
        ),
        (
            "letter ∩ (a,b,c,d,e)",
            Some(record(vec![("letter", vec!["a", "e"].into())])),
            true,
        ),
        (
            "letter ∩ (a,b,c,d,e)",
            Some(record(vec![("letter", vec!["a", "e", "f"].into())])),
            true,
        ),
        (
            "letter ∩ (a,b,c,d, e)",
            Some(record(vec![("letter", vec!["f"].into())])),
            false,
        ),
        (
            "letter ∩ (a,b,c,d, e)",
            Some(record(vec![("letter", "c".into())])),
            true,
        ),
        (
            "letter ∩ (1,2,3)",
            Some(record(vec![("letter", vec![2.0, 3.0].into())])),
            true,
        ),
        (
            "letter ∩ (1,2,3)",
            Some(record(vec![("letter", vec![2i64, 5].into())])),
            true,
        ),
        (
            "letter ∩ (1,2,3)",
            Some(record(vec![("letter", vec![4i64, 5].into())])),
            false,
        ),
        (
            "letter !∩ (1,2,3)",
            Some(record(vec![("letter", vec![4i64, 5].into())])),
            true,
        ),
    ]);
}

#[test]
fn combined() {
    check(vec![
        (
            "age>23 and (sex in (boy,girl) or sex='other') and score>=95 and rank !in (b,c,d)",
            Some(record(vec![
                ("age", 24i64.into()),
                ("sex", "boy".into()),
                ("score", 95i64.into()),
                ("rank", "s".into()),
            ])),
            true,
        ),
        (
            "age>23 and (sex in (boy,girl) or sex='other')",
            Some(record(vec![("age", 24i64.into()), ("sex", "other".into())])),
            true,
        ),
        (
            "age>23 and (sex in (boy,girl) or sex='other')",
            Some(record(vec![("age", 24i64.into()), ("sex", "boy".into())])),
            true,
        ),
        (
            "age>23 and (sex in (boy,girl) or some!=5) and words='hello world'",
            Some(record(vec![
                ("age", 211i64.into()),
                ("sex", "boy".into()),
                ("some", 6i64.into()),
                ("words", "hello world".into()),
            ])),
            true,
        ),
        (
            "age>23 and (sex in (boy,girl) or some!=5) and words='hello world'",
            Some(record(vec![
                ("age", 21i64.into()),
                ("sex", "boy".into()),
                ("some", 6i64.into()),
                ("words", "hello world".into()),
            ])),
            false,
        ),
        (
            "tag in (1,3,5) and status!=0",
            Some(record(vec![
                ("tag", vec![1i64, 5].into()),
                ("status", 3i64.into()),
            ])),
            true,
        ),
    ]);
}

#[test]
fn negated_operators_on_missing_field() {
    let data = record(vec![("other", 1i64.into())]);
    for predicate in ["a!=1", "a !in (1)", "a !∩ (1)"] {
        assert!(!matches(predicate, Some(&data)).unwrap(), "{predicate}");
        assert!(!matches(predicate, None).unwrap(), "{predicate}");
    }
}

#[test]
fn field_names_are_case_sensitive() {
    let data = record(vec![("Age", 30i64.into())]);
    assert!(!matches("age=30", Some(&data)).unwrap());
    assert!(matches("Age=30", Some(&data)).unwrap());
}
