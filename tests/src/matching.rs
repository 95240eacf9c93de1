use pretty_assertions::assert_eq;
use retrace_compiler::*;

fn first_match(regex: &str, input: &str) -> Option<(usize, usize, String)> {
    let pattern = compile(regex).unwrap();
    let mut matcher = pattern.matcher(input);

    matcher.find().then(|| {
        (
            matcher.start().unwrap(),
            matcher.end().unwrap(),
            matcher.as_str().unwrap().to_string(),
        )
    })
}

#[test]
fn should_find_each_literal_occurrence_then_stop() {
    let pattern = compile("cat").unwrap();
    let mut matcher = pattern.matcher("one cat two cats in the yard");

    let mut spans = vec![];
    while matcher.find() {
        spans.push((matcher.start().unwrap(), matcher.end().unwrap()));
    }

    assert_eq!(vec![(4, 7), (12, 15)], spans);
    assert_eq!(Err(MatchError::NoMatchAvailable), matcher.start());
}

#[test]
fn should_replace_matches() {
    let input_output = vec![
        ("cat", "one cat two cats in the yard", "dog", "one dog two dogs in the yard"),
        ("(\\w+)@(\\w+)", "me@host", "$2 at $1", "host at me"),
        ("(?<user>\\w+)@\\w+", "me@host", "${user}!", "me!"),
        ("a", "banana", "\\$", "b$n$n$"),
        ("x", "banana", "y", "banana"),
        ("a*", "baa", "-", "-b--"),
    ];

    for (test_id, (regex, input, replacement, expected)) in input_output.into_iter().enumerate()
    {
        let pattern = compile(regex).unwrap();
        let res = pattern.matcher(input).replace_all(replacement);
        assert_eq!((test_id, Ok(expected.to_string())), (test_id, res));
    }
}

#[test]
fn should_replace_only_first_match() {
    let pattern = compile("o").unwrap();

    assert_eq!(
        Ok("f0o".to_string()),
        pattern.matcher("foo").replace_first("0")
    );
}

#[test]
fn should_reject_malformed_replacements() {
    let pattern = compile("(a)").unwrap();
    let input_output = vec![
        ("$", MatchError::IllegalGroupReference),
        ("$2", MatchError::NoSuchGroup(2)),
        ("x\\", MatchError::TrailingEscape),
        ("${nope}", MatchError::NoSuchGroupName("nope".to_string())),
    ];

    for (test_id, (replacement, expected)) in input_output.into_iter().enumerate() {
        let res = pattern.matcher("a").replace_all(replacement);
        assert_eq!((test_id, Err(expected)), (test_id, res));
    }
}

#[test]
fn should_expand_lazy_quantifiers_only_as_needed() {
    let input_output = vec![
        ("a*", "aaa", Some((0, 3, "aaa".to_string()))),
        ("a*?a", "aaa", Some((0, 1, "a".to_string()))),
        ("a*?b", "aaab", Some((0, 4, "aaab".to_string()))),
        ("a{2}+", "aaaaa", Some((0, 2, "aa".to_string()))),
    ];

    for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
        assert_eq!((test_id, expected), (test_id, first_match(regex, input)));
    }
}

#[test]
fn should_fail_back_references_to_unset_groups() {
    let input_output = vec![
        ("(a)\\1", "aa", true),
        ("(a)\\1", "ab", false),
        ("(a)?\\1", "b", false),
        ("(a)?b\\1", "b", false),
        ("(a|b)\\1+", "bbb", true),
    ];

    for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
        assert_eq!((test_id, Ok(expected)), (test_id, matches(regex, input)));
    }
}

#[test]
fn should_require_bounded_look_behind() {
    let err = compile("(?<=a*)b").unwrap_err();

    assert_eq!(&SyntaxErrorKind::UnboundedLookBehind, err.kind());
    assert_eq!(
        "Look-behind group does not have an obvious maximum length",
        err.description()
    );
    assert_eq!(
        Some((2, 3, "b".to_string())),
        first_match("(?<=a{1,3})b", "aab")
    );
}

#[test]
fn should_report_unset_groups_as_absent() {
    let pattern = compile("(a)?(b)").unwrap();
    let mut matcher = pattern.matcher("b");

    assert!(matcher.matches());
    assert_eq!(Ok(None), matcher.group(1));
    assert_eq!(Ok(None), matcher.start_group(1));
    assert_eq!(Ok(Some("b")), matcher.group(2));
    assert_eq!(Ok(Some(0)), matcher.start_group(2));
    assert_eq!(Err(MatchError::NoSuchGroup(3)), matcher.group(3));
}

#[test]
fn should_reject_result_queries_without_a_match() {
    let pattern = compile("a").unwrap();
    let mut matcher = pattern.matcher("b");

    assert_eq!(Err(MatchError::NoMatchAvailable), matcher.group(0));
    assert!(!matcher.find());
    assert_eq!(Err(MatchError::NoMatchAvailable), matcher.end());
    assert_eq!(Err(MatchError::IllegalStartIndex(2)), matcher.find_from(2));
}

#[test]
fn should_anchor_according_to_the_operation() {
    let pattern = compile("ab").unwrap();
    let mut matcher = pattern.matcher("abc");

    assert!(!matcher.matches());
    assert!(matcher.looking_at());
    assert_eq!(Ok("ab"), matcher.as_str());

    let mut matcher = pattern.matcher("cab");
    assert!(!matcher.looking_at());
    assert!(matcher.find());
    assert_eq!(Ok(1), matcher.start());
}

#[test]
fn should_limit_searches_to_a_region() {
    let pattern = compile("\\d+").unwrap();
    let mut matcher = pattern.matcher("12 345 6789");

    matcher.region(3, 6).unwrap();
    assert!(matcher.matches());
    assert_eq!(Ok("345"), matcher.as_str());
    assert_eq!(
        Err(MatchError::IllegalRegion { start: 4, end: 12 }),
        matcher.region(4, 12).map(|_| ())
    );
}

#[test]
fn should_resume_from_a_given_index() {
    let pattern = compile("\\w+").unwrap();
    let mut matcher = pattern.matcher("ab cd ef");

    assert_eq!(Ok(true), matcher.find_from(4));
    assert_eq!(Ok("d"), matcher.as_str());
    assert!(matcher.find());
    assert_eq!(Ok("ef"), matcher.as_str());
}

#[test]
fn should_report_offsets_in_characters() {
    assert_eq!(
        Some((2, 4, "λμ".to_string())),
        first_match("\\p{InGreek}+", "äöλμ")
    );
    assert_eq!(
        Some((1, 2, "é".to_string())),
        first_match("\\p{L1}", "ʒé")
    );
}

#[test]
fn should_continue_from_last_match_with_boundary_g() {
    let pattern = compile("\\G\\d").unwrap();
    let mut matcher = pattern.matcher("12a3");

    let mut found = vec![];
    while matcher.find() {
        found.push(matcher.as_str().unwrap());
    }

    assert_eq!(vec!["1", "2"], found);
}

#[test]
fn should_stay_exhausted_until_reset() {
    let pattern = compile("o").unwrap();
    let mut matcher = pattern.matcher("foo");

    assert!(matcher.find());
    assert!(matcher.find());
    assert!(!matcher.find());
    assert!(!matcher.find());
    assert_eq!(Err(MatchError::NoMatchAvailable), matcher.start());

    matcher.reset();
    assert!(matcher.find());
    assert_eq!(Ok(1), matcher.start());
}

#[test]
fn should_match_reordered_marks_under_canonical_equivalence() {
    // dot below (class 220) and acute (class 230) may appear in either order.
    let pattern = compile_with_flags("a\u{323}\u{301}", Flags::CANON_EQ).unwrap();
    let inputs = vec![
        "a\u{323}\u{301}",
        "a\u{301}\u{323}",
        "\u{1ea1}\u{301}",
        "\u{e1}\u{323}",
    ];

    for (test_id, input) in inputs.into_iter().enumerate() {
        let mut matcher = pattern.matcher(input);
        assert_eq!((test_id, true), (test_id, matcher.matches()));
    }

    let mut matcher = pattern.matcher("xa\u{301}\u{323}y");
    assert!(matcher.find());
    assert_eq!((Ok(1), Ok(4)), (matcher.start(), matcher.end()));
    assert!(!pattern.matcher("a\u{301}").matches());
}
