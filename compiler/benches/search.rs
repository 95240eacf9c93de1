use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use retrace_compiler::*;

fn input_of_length_with_suffix(pad_str: &str, suffix: &str, len: usize) -> String {
    pad_str
        .chars()
        .cycle()
        .take(len.saturating_sub(suffix.chars().count()))
        .chain(suffix.chars())
        .collect()
}

pub fn literal_search_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("literal search input length comparison");
    let pattern = compile("needle").unwrap();

    (6..16)
        .map(|exponent| 2usize.pow(exponent))
        .map(|input_len| (input_of_length_with_suffix("haystack ", "needle", input_len), input_len))
        .for_each(|(input, sample_size)| {
            group.throughput(Throughput::Elements(sample_size as u64));
            group.bench_with_input(
                BenchmarkId::new("input length of size", sample_size),
                &input,
                |b, input| b.iter(|| assert!(pattern.matcher(input).find())),
            );
        })
}

pub fn backtracking_search_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtracking search input length comparison");
    let pattern = compile("(\\w+)\\s*=\\s*(\\d+);").unwrap();

    (6..16)
        .map(|exponent| 2usize.pow(exponent))
        .map(|input_len| (input_of_length_with_suffix("key = value, ", "x=1;", input_len), input_len))
        .for_each(|(input, sample_size)| {
            group.throughput(Throughput::Elements(sample_size as u64));
            group.bench_with_input(
                BenchmarkId::new("input length of size", sample_size),
                &input,
                |b, input| b.iter(|| assert!(pattern.matcher(input).find())),
            );
        })
}

criterion_group!(benches, literal_search_comparison, backtracking_search_comparison);
criterion_main!(benches);
