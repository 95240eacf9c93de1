use std::sync::Arc;
use std::thread;

use retrace_compiler::compile;
use retrace_runtime::Pattern;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn should_share_compiled_patterns_across_threads() {
    assert_send_sync::<Pattern>();

    let pattern = Arc::new(compile("(\\w)(\\w*)-(\\d+)").unwrap());
    let inputs = ["alpha-1", "be-22", "c-333", "delta-4444"];

    let handles: Vec<_> = inputs
        .iter()
        .map(|input| {
            let pattern = Arc::clone(&pattern);
            let input = input.to_string();

            thread::spawn(move || {
                let mut captures = vec![];
                for _ in 0..100 {
                    let mut matcher = pattern.matcher(&input);
                    assert!(matcher.matches());
                    captures = (1..=3)
                        .map(|group| matcher.group(group).unwrap().unwrap().to_string())
                        .collect();
                }
                captures
            })
        })
        .collect();

    let results: Vec<Vec<String>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(
        vec![
            vec!["a", "lpha", "1"],
            vec!["b", "e", "22"],
            vec!["c", "", "333"],
            vec!["d", "elta", "4444"],
        ],
        results
    );
}
