use pretty_assertions::assert_eq;
use retrace_compiler::*;

fn find_all(regex: &str, input: &str) -> Vec<(usize, usize)> {
    let pattern = compile(regex).unwrap();
    let mut matcher = pattern.matcher(input);

    let mut found = vec![];
    while matcher.find() {
        found.push((matcher.start().unwrap(), matcher.end().unwrap()));
    }
    found
}

#[test]
fn should_end_look_behind_on_the_first_accepted_alternative() {
    // the condition is not retried once an alternative accepts short of the
    // current position.
    let input_output = vec![
        ("(?<=a|ab)c", "abc", vec![]),
        ("(?<=ab|a)c", "abc", vec![(2, 3)]),
        ("(?<=a|ab)c", "ac", vec![(1, 2)]),
        ("(?<!a|ab)c", "abc", vec![(2, 3)]),
        ("(?<=b)c", "abc", vec![(2, 3)]),
    ];

    for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
        assert_eq!((test_id, expected), (test_id, find_all(regex, input)));
    }
}

#[test]
fn should_keep_groups_captured_inside_look_ahead() {
    let pattern = compile("(?=(a))\\1").unwrap();
    let mut matcher = pattern.matcher("a");

    assert!(matcher.matches());
    assert_eq!(Ok(Some("a")), matcher.group(1));
    assert_eq!((Ok(0), Ok(1)), (matcher.start(), matcher.end()));

    assert_eq!(vec![(1, 2), (3, 4)], find_all("(?=(a))\\1", "bab a"));
    assert!(!pattern.matcher("b").matches());
}
