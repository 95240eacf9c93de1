use retrace_compiler::compile;

/// Interleaves split pieces with the delimiters the pattern matched.
fn rejoin(regex: &str, input: &str) -> String {
    let pattern = compile(regex).unwrap();
    let pieces = pattern.split_limit(input, -1);

    let mut matcher = pattern.matcher(input);
    let mut delimiters = vec![];
    while matcher.find() {
        delimiters.push(matcher.as_str().unwrap());
    }

    let mut joined = String::new();
    for (idx, piece) in pieces.iter().enumerate() {
        joined.push_str(piece);
        if let Some(delimiter) = delimiters.get(idx) {
            joined.push_str(delimiter);
        }
    }
    joined
}

#[test]
fn should_reconstruct_input_from_pieces_and_delimiters() {
    let input_output = vec![
        (",", "a,b,,c,"),
        ("\\s*;\\s*", "x ; y;z  ;"),
        ("\\d+", "12ab3cd45"),
        ("[.]", "no delimiters"),
        ("(?i)AND", "cats and Dogs AND birds"),
    ];

    for (test_id, (regex, input)) in input_output.into_iter().enumerate() {
        assert_eq!((test_id, input.to_string()), (test_id, rejoin(regex, input)));
    }
}

#[test]
fn should_split_by_limit() {
    let input_output = vec![
        (0, vec!["boo", "and", "foo"]),
        (2, vec!["boo", "and:foo"]),
        (5, vec!["boo", "and", "foo"]),
        (-2, vec!["boo", "and", "foo"]),
    ];
    let pattern = compile(":").unwrap();

    for (test_id, (limit, expected)) in input_output.into_iter().enumerate() {
        assert_eq!(
            (test_id, expected),
            (test_id, pattern.split_limit("boo:and:foo", limit))
        );
    }
}

#[test]
fn should_drop_trailing_empty_pieces_without_limit() {
    let pattern = compile("o").unwrap();

    assert_eq!(vec!["b", "", ":and:f"], pattern.split("boo:and:foo"));
    assert_eq!(
        vec!["b", "", ":and:f", "", ""],
        pattern.split_limit("boo:and:foo", -1)
    );
    assert_eq!(vec!["whole"], pattern.split("whole"));
}
