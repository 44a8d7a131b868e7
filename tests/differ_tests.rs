use serde::Serialize;
use valdiff::{
    to_value, DiffConfig, DiffContext, DiffError, DiffFormatter, DiffOperation, Differ, FacetKey,
    InspectionNode, InspectionTree, OperationKind, OperationSequence, OperationalSequencer,
    Registry, Value, ValueClass,
};

fn person(name: &str, age: i64) -> Value {
    Value::object("Person", [("name", Value::from(name)), ("age", Value::from(age))])
}

fn mirror(operation: &DiffOperation) -> DiffOperation {
    let key = operation.key().clone();
    match operation.kind() {
        OperationKind::Add => DiffOperation::delete(key, operation.actual().unwrap().clone()),
        OperationKind::Delete => DiffOperation::add(key, operation.expected().unwrap().clone()),
        OperationKind::NoChange => operation.clone(),
        OperationKind::Change => {
            let expected = operation.actual().unwrap().clone();
            let actual = operation.expected().unwrap().clone();
            match operation.children() {
                Some(children) => DiffOperation::nested_change(
                    key,
                    expected,
                    actual,
                    OperationSequence::new(
                        children.value_class.clone(),
                        children.operations.iter().map(mirror).collect(),
                    ),
                ),
                None => DiffOperation::change(key, expected, actual),
            }
        }
    }
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

#[test]
fn test_object_scenario() {
    let expected = Value::object("A", [("name", Value::from("x")), ("age", Value::from(1))]);
    let actual = Value::object("B", [("name", Value::from("y")), ("age", Value::from(1))]);
    let differ = Differ::new();

    let sequence = differ.operations(&expected, &actual).unwrap();
    assert_eq!(
        sequence.operations,
        vec![
            DiffOperation::change(
                FacetKey::Field("name".into()),
                Value::from("x"),
                Value::from("y")
            ),
            DiffOperation::no_change(FacetKey::Field("age".into()), Value::from(1), Value::from(1)),
        ]
    );

    assert_eq!(
        differ.call(&expected, &actual).unwrap(),
        vec!["#<B", "~ name: \"x\" => \"y\"", "  age: 1", ">"]
    );
}

#[test]
fn test_hash_scenario() {
    let expected = Value::hash([("a", Value::from(1))]);
    let actual = Value::hash([("a", Value::from(1)), ("b", Value::from(2))]);
    let sequence = Differ::new().operations(&expected, &actual).unwrap();
    assert_eq!(
        sequence.operations,
        vec![
            DiffOperation::no_change(FacetKey::Key("a".into()), Value::from(1), Value::from(1)),
            DiffOperation::add(FacetKey::Key("b".into()), Value::from(2)),
        ]
    );
}

#[test]
fn test_reflexivity() {
    let values = vec![
        person("x", 1),
        Value::hash([
            ("list", Value::from(vec![1, 2, 3])),
            ("nested", Value::hash([("inner", person("y", 2))])),
            ("nothing", Value::Nil),
        ]),
        Value::from(vec![person("a", 1), person("b", 2)]),
        Value::hash([("a", Value::hash([("x", Value::Float(f64::NAN))]))]),
        Value::Nil,
        Value::from(42),
        Value::Float(f64::NAN),
        Value::from("text"),
        Value::symbol("ok"),
    ];
    let differ = Differ::new();
    for value in &values {
        let copy = value.clone();
        for sequence in [
            differ.operations(value, value).unwrap(),
            differ.operations(value, &copy).unwrap(),
        ] {
            assert!(sequence
                .operations
                .iter()
                .all(|op| op.kind() == OperationKind::NoChange));
        }
    }
}

#[test]
fn test_every_pair_has_a_diff() {
    let values = vec![
        Value::Nil,
        Value::from(1),
        Value::from("1"),
        Value::from(vec![1]),
        Value::hash([("a", Value::from(1))]),
        person("x", 1),
    ];
    let differ = Differ::new();
    for expected in &values {
        for actual in &values {
            let lines = differ.call(expected, actual).unwrap();
            assert!(!lines.is_empty());
            assert_eq!(
                differ.operations(expected, actual).unwrap().is_unchanged(),
                std::ptr::eq(expected, actual)
            );
        }
    }
}

#[test]
fn test_whole_value_rendering() {
    let differ = Differ::new();
    assert_eq!(differ.call(&Value::from(1), &Value::from(1)).unwrap(), vec!["  1"]);
    assert_eq!(
        differ.call(&Value::from(vec![1]), &person("x", 1)).unwrap(),
        vec!["~ [1] => #<Person name: \"x\", age: 1>"]
    );
}

#[test]
fn test_ignore_whitespace_inside_nested_values() {
    let differ = Differ::builder()
        .config(DiffConfig {
            ignore_whitespace: true,
            ..Default::default()
        })
        .build();
    let expected = Value::hash([("a", Value::hash([("s", Value::from("x  y"))]))]);
    let actual = Value::hash([("a", Value::hash([("s", Value::from("x y"))]))]);

    let sequence = differ.operations(&expected, &actual).unwrap();
    assert_eq!(sequence.operations[0].kind(), OperationKind::NoChange);
    assert!(sequence.is_unchanged());
    assert_eq!(
        differ.call(&expected, &actual).unwrap(),
        vec!["{", "  a: { s: \"x y\" }", "}"]
    );
}

#[test]
fn test_values_far_deeper_than_limit() {
    let nest = |leaf: i32| {
        let mut value = Value::from(leaf);
        for _ in 0..1_000 {
            value = Value::Array(vec![value]);
        }
        Value::hash([("root", value)])
    };
    let (expected, actual) = (nest(1), nest(2));
    let differ = Differ::new();

    assert_eq!(
        differ.operations(&expected, &actual).unwrap_err(),
        DiffError::max_depth_exceeded(64)
    );
    let fallback = differ.diff_or_inspect(&expected, &actual);
    assert_eq!(fallback.len(), 2);
    assert!(fallback[0].starts_with("Expected: { root: [[["));
    assert!(fallback[0].contains("[...]"));
    assert!(differ.operations(&expected, &expected).unwrap().is_unchanged());
}

#[test]
fn test_anti_symmetry() {
    let left = Value::hash([
        ("same", Value::from(1)),
        ("changed", Value::from("old")),
        ("only_left", Value::from(true)),
        (
            "nested",
            Value::object("Inner", [("x", Value::from(1)), ("y", Value::from(2))]),
        ),
    ]);
    let right = Value::hash([
        ("same", Value::from(1)),
        ("changed", Value::from("new")),
        (
            "nested",
            Value::object("Inner", [("x", Value::from(5)), ("y", Value::from(2))]),
        ),
        ("only_right", Value::from(3)),
    ]);
    let differ = Differ::new();
    let forward = differ.operations(&left, &right).unwrap();
    let backward = differ.operations(&right, &left).unwrap();

    let mirrored: Vec<DiffOperation> = forward.operations.iter().map(mirror).collect();
    for operation in &backward.operations {
        assert!(
            mirrored.contains(operation),
            "missing mirror of {:?}",
            operation
        );
    }
    assert_eq!(mirrored.len(), backward.operations.len());
}

#[test]
fn test_rendering_is_idempotent() {
    let differ = Differ::new();
    let expected = Value::hash([("p", person("x", 1)), ("n", Value::from(1))]);
    let actual = Value::hash([("p", person("y", 1)), ("m", Value::from(2))]);
    let sequence = differ.operations(&expected, &actual).unwrap();

    let first = differ.format(&sequence).unwrap();
    let second = differ.format(&sequence).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        differ.call(&expected, &actual).unwrap(),
        differ.call(&expected, &actual).unwrap()
    );
}

#[test]
fn test_indentation_matches_depth() {
    let differ = Differ::new();
    let expected = Value::hash([(
        "a",
        Value::hash([("b", Value::hash([("c", Value::from(1)), ("d", Value::from(0))]))]),
    )]);
    let actual = Value::hash([(
        "a",
        Value::hash([("b", Value::hash([("c", Value::from(2)), ("d", Value::from(0))]))]),
    )]);

    let lines = differ.lines(&expected, &actual, 0).unwrap();
    let rendered = differ.call(&expected, &actual).unwrap();
    assert_eq!(
        rendered,
        vec![
            "{",
            "~ a: {",
            "  ~ b: {",
            "    ~ c: 1 => 2",
            "      d: 0",
            "    }",
            "  }",
            "}",
        ]
    );

    for (line, text) in lines.iter().zip(&rendered) {
        let expected_spaces = line.indent_level * differ.config().indent_width;
        if line.marker.as_char() == ' ' {
            assert_eq!(leading_spaces(text), expected_spaces, "line {:?}", text);
        } else {
            assert_eq!(leading_spaces(text), expected_spaces - 2, "line {:?}", text);
        }
    }
}

#[test]
fn test_deleted_and_added_facets() {
    let expected = person("x", 1);
    let actual = Value::object("Person", [("name", Value::from("x")), ("email", Value::from("e"))]);
    assert_eq!(
        Differ::new().call(&expected, &actual).unwrap(),
        vec!["#<Person", "  name: \"x\"", "+ email: \"e\"", "- age: 1", ">"]
    );
}

#[test]
fn test_serde_structs() {
    #[derive(Serialize)]
    struct Address {
        city: String,
    }

    #[derive(Serialize)]
    struct User {
        id: u32,
        tags: Vec<&'static str>,
        address: Address,
    }

    let expected = to_value(&User {
        id: 1,
        tags: vec!["a", "b"],
        address: Address { city: "Oslo".into() },
    })
    .unwrap();
    let actual = to_value(&User {
        id: 1,
        tags: vec!["a"],
        address: Address {
            city: "Bergen".into(),
        },
    })
    .unwrap();

    assert_eq!(
        Differ::new().call(&expected, &actual).unwrap(),
        vec![
            "#<User",
            "  id: 1",
            "~ tags: [",
            "    \"a\"",
            "  - \"b\"",
            "  ]",
            "~ address: #<Address",
            "  ~ city: \"Oslo\" => \"Bergen\"",
            "  >",
            ">",
        ]
    );
}

#[test]
fn test_max_depth_is_reported() {
    let differ = Differ::builder()
        .config(DiffConfig {
            max_depth: 0,
            ..Default::default()
        })
        .build();
    let expected = Value::hash([("a", Value::hash([("b", Value::from(1))]))]);
    let actual = Value::hash([("a", Value::hash([("b", Value::from(2))]))]);
    assert_eq!(
        differ.call(&expected, &actual).unwrap_err(),
        DiffError::max_depth_exceeded(0)
    );

    let fallback = differ.diff_or_inspect(&expected, &actual);
    assert_eq!(fallback, vec!["Expected: { a: { b: 1 } }", "  Actual: { a: { b: 2 } }"]);
}

/// Compares multi-character strings character by character.
struct CharSequencer;

impl OperationalSequencer for CharSequencer {
    fn name(&self) -> &'static str {
        "chars"
    }

    fn applies_to(&self, expected: &Value, actual: &Value) -> bool {
        let longer_than_one = |value: &Value| match value {
            Value::String(s) => s.chars().count() > 1,
            _ => false,
        };
        longer_than_one(expected) && longer_than_one(actual)
    }

    fn call(
        &self,
        expected: &Value,
        actual: &Value,
        ctx: &DiffContext<'_>,
    ) -> Result<OperationSequence, DiffError> {
        let chars = |value: &Value| match value {
            Value::String(s) => s.chars().map(|c| Value::from(c.to_string())).collect(),
            _ => Vec::new(),
        };
        let (expected, actual) = (Value::Array(chars(expected)), Value::Array(chars(actual)));
        let operations = valdiff::sequencer::sequence_facets(
            expected.facets().unwrap_or_default(),
            actual.facets().unwrap_or_default(),
            ctx,
        )?;
        Ok(OperationSequence::new(ValueClass::Array, operations))
    }
}

/// Renders array diffs between angle brackets.
struct AngleFormatter;

impl DiffFormatter for AngleFormatter {
    fn name(&self) -> &'static str {
        "angle"
    }

    fn applies_to(&self, sequence: &OperationSequence) -> bool {
        sequence.value_class == ValueClass::Array
    }

    fn call(
        &self,
        sequence: &OperationSequence,
        _formatters: &Registry<dyn DiffFormatter>,
    ) -> Result<InspectionTree, DiffError> {
        Ok(InspectionTree::new()
            .with(InspectionNode::CollectionOpen("<".into()))
            .with(InspectionNode::Primitive(format!(
                "{} ops",
                sequence.operations.len()
            )))
            .with(InspectionNode::CollectionClose(">".into())))
    }
}

#[test]
fn test_extra_sequencer_takes_priority() {
    let differ = Differ::builder().sequencer(CharSequencer).build();
    let expected = Value::hash([("word", Value::from("ab"))]);
    let actual = Value::hash([("word", Value::from("ac"))]);
    assert_eq!(
        differ.call(&expected, &actual).unwrap(),
        vec![
            "{",
            "~ word: [",
            "    \"a\"",
            "  ~ \"b\" => \"c\"",
            "  ]",
            "}",
        ]
    );

    let top_level = differ.call(&Value::from("ab"), &Value::from("ab")).unwrap();
    assert_eq!(top_level, vec!["[", "  \"a\"", "  \"b\"", "]"]);
}

#[test]
fn test_extra_formatter_takes_priority() {
    let differ = Differ::builder().formatter(AngleFormatter).build();
    let lines = differ
        .call(&Value::from(vec![1, 2]), &Value::from(vec![1]))
        .unwrap();
    assert_eq!(lines, vec!["<", "2 ops", ">"]);
}
