//! Evaluator benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mwanga_runtime::Mwanga;

const FIB: &str = "
    fanya fib = unda(n) {
        kama (n < 2) { rudisha n }
        fib(n - 1) + fib(n - 2)
    };
    fib(15)
";

const LOOP_SUM: &str = "
    fanya jumla = 0;
    fanya i = 0;
    wakati (i < 1000) {
        jumla += i;
        i++;
    };
    jumla
";

const STRING_BUILD: &str = "
    fanya s = \"\";
    kwa i, c ktk \"abcdefghij\" * 20 {
        s += c;
    };
    urefu(s)
";

fn bench_recursive_fib(c: &mut Criterion) {
    c.bench_function("fib_recursive_15", |b| {
        b.iter(|| {
            let runtime = Mwanga::new();
            runtime.eval(black_box(FIB)).unwrap()
        })
    });
}

fn bench_while_loop(c: &mut Criterion) {
    c.bench_function("while_sum_1000", |b| {
        b.iter(|| {
            let runtime = Mwanga::new();
            runtime.eval(black_box(LOOP_SUM)).unwrap()
        })
    });
}

fn bench_for_in_strings(c: &mut Criterion) {
    c.bench_function("for_in_string_build", |b| {
        b.iter(|| {
            let runtime = Mwanga::new();
            runtime.eval(black_box(STRING_BUILD)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_recursive_fib,
    bench_while_loop,
    bench_for_in_strings
);
criterion_main!(benches);
