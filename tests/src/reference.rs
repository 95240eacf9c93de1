//! Whole-input matching compared against the `regex` crate over every short
//! string of a small alphabet.

use retrace_compiler::compile;

const PATTERNS: &[&str] = &[
    "a*b*",
    "(a|b)*abb",
    "(ab|a)(b|ba)?",
    "a{2,3}b?",
    "[ab]{3}",
    "(a*)*",
    "(a|ab)*",
    "a?a?aa",
    "(?i)A+b",
    "[^a]*",
    "b+?a*?",
    "(?:a|b)(?:ab)*",
    "a{0,2}b{1,}",
    "(a|b)*(aa|bb)(a|b)*",
];

fn inputs_up_to(alphabet: &[char], len: usize) -> Vec<String> {
    let mut inputs = vec![String::new()];
    let mut frontier = vec![String::new()];

    for _ in 0..len {
        frontier = frontier
            .iter()
            .flat_map(|prefix| alphabet.iter().map(move |c| format!("{}{}", prefix, c)))
            .collect();
        inputs.extend(frontier.iter().cloned());
    }

    inputs
}

#[test]
fn should_generate_every_input_up_to_length() {
    let inputs = inputs_up_to(&['a', 'b'], 3);

    assert_eq!(1 + 2 + 4 + 8, inputs.len());
    assert!(inputs.contains(&"bab".to_string()));
}

#[test]
fn should_agree_with_reference_engine_on_whole_matches() {
    let inputs = inputs_up_to(&['a', 'b'], 6);

    for (test_id, regex) in PATTERNS.iter().enumerate() {
        let pattern = compile(regex).unwrap();
        let reference = regex::Regex::new(&format!("^(?:{})$", regex)).unwrap();

        for input in inputs.iter() {
            assert_eq!(
                (test_id, input.as_str(), reference.is_match(input)),
                (test_id, input.as_str(), pattern.matcher(input).matches())
            );
        }
    }
}

#[test]
fn should_agree_with_reference_engine_on_leftmost_matches() {
    let input_output = [
        ("a+", "baaab"),
        ("(a|b)b", "aabb"),
        ("b*", "abb"),
        ("ab|a", "xab"),
        ("a{2}", "abaaa"),
    ];

    for (test_id, (regex, input)) in input_output.into_iter().enumerate() {
        let pattern = compile(regex).unwrap();
        let reference = regex::Regex::new(regex).unwrap();
        let mut matcher = pattern.matcher(input);

        let expected = reference.find(input).map(|m| (m.start(), m.end()));
        let res = matcher
            .find()
            .then(|| (matcher.start().unwrap(), matcher.end().unwrap()));
        assert_eq!((test_id, expected), (test_id, res));
    }
}
