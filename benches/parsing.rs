//! Benchmarks for CSV parsing and total recomputation.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csvcalc::{parse_document, CalcOptions, Ledger, TemplateBinding};

/// Build an `id,name,price` CSV with `rows` data rows.
fn catalog(rows: usize) -> String {
    let mut text = String::from("id,name,price\n");
    for i in 0..rows {
        text.push_str(&format!("{i},item {i},{}\n", (i % 97) + 1));
    }
    text
}

fn binding() -> TemplateBinding {
    TemplateBinding { id_column: Some(0) }
}

/// Benchmark parsing at several catalog sizes
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_document");
    let options = CalcOptions::default();
    for rows in [100, 1_000, 10_000] {
        let text = catalog(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &text, |b, text| {
            b.iter(|| parse_document(black_box(text), &options))
        });
    }
    group.finish();
}

/// Benchmark a quantity edit, which recomputes the total over every row
fn bench_apply_quantity(c: &mut Criterion) {
    let doc = parse_document(&catalog(10_000), &CalcOptions::default());
    let rows = binding().materialize(&doc);
    let mut ledger = Ledger::from_columns(&rows, 0, 2, true);

    c.bench_function("apply_quantity_10k_rows", |b| {
        b.iter(|| {
            ledger
                .apply_quantity(black_box(5_000), black_box("３"))
                .expect("row exists")
        })
    });
}

criterion_group!(benches, bench_parse, bench_apply_quantity);
criterion_main!(benches);
