//! Benchmarks for mik-filter conversion.
//!
//! Run with: cargo bench -p mik-filter

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mik_filter::{Converter, PgArrayLiteral, is_valid_sql_identifier};
use std::hint::black_box;

fn plain() -> Converter {
    Converter::builder().allow_all_columns().build().unwrap()
}

fn nested() -> Converter {
    Converter::builder()
        .nested_jsonb("meta", &["created_at", "updated_at"])
        .disallow_columns(&["password"])
        .build()
        .unwrap()
}

// =============================================================================
// Identifier Validation Benchmarks
// =============================================================================

fn bench_identifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("identifier");

    let identifiers = [
        ("short", "id"),
        ("medium", "user_email_address"),
        ("long", "very_long_column_name_with_many_parts_here"),
        ("invalid", "\"bla = 1 --"),
    ];

    for (name, ident) in identifiers {
        group.bench_with_input(BenchmarkId::new("validate", name), ident, |b, s| {
            b.iter(|| is_valid_sql_identifier(black_box(s)))
        });
    }

    group.finish();
}

// =============================================================================
// Conversion Benchmarks
// =============================================================================

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");

    let filters = [
        ("empty", "{}"),
        ("single_field", r#"{"name": "John"}"#),
        (
            "operators",
            r#"{"age": {"$gte": 18, "$lt": 65}, "status": {"$in": ["NEW", "OPEN", "DONE"]}}"#,
        ),
        (
            "logical",
            r#"{"$or": [{"name": "John"}, {"name": "Doe"}], "$not": {"status": "DELETED"}}"#,
        ),
        (
            "readme",
            r#"{"$or": [{"map": {"$regex": "aztec"}}, {"map": {"$regex": "nuke"}}], "password": "", "playerCount": {"$gte": 2, "$lt": 10}}"#,
        ),
    ];

    let plain = plain();
    for (name, filter) in filters {
        group.bench_with_input(BenchmarkId::new("plain", name), filter, |b, f| {
            b.iter(|| plain.convert_str(black_box(f), 1))
        });
    }

    let nested = nested();
    for (name, filter) in filters {
        group.bench_with_input(BenchmarkId::new("nested", name), filter, |b, f| {
            b.iter(|| nested.convert_str(black_box(f), 1))
        });
    }

    group.finish();
}

fn bench_complex_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("complex");

    let converter = Converter::builder()
        .nested_jsonb("meta", &["created_at", "tags"])
        .array_encoder(PgArrayLiteral)
        .build()
        .unwrap();

    let elem_match = r#"{"tags": {"$elemMatch": {"$in": ["red", "green", "blue"]}}, "score": {"$gt": {"$field": "threshold"}}}"#;
    group.bench_function("elem_match", |b| {
        b.iter(|| converter.convert_str(black_box(elem_match), 1))
    });

    // 50 OR branches
    let wide = format!(
        r#"{{"$or": [{}]}}"#,
        (0..50)
            .map(|i| format!(r#"{{"field_{i}": {{"$gte": {i}}}}}"#))
            .collect::<Vec<_>>()
            .join(", ")
    );
    group.bench_function("wide_or_50", |b| {
        b.iter(|| converter.convert_str(black_box(&wide), 1))
    });

    // 20 levels of $not
    let mut deep = r#"{"name": "x"}"#.to_string();
    for _ in 0..20 {
        deep = format!(r#"{{"$not": {deep}}}"#);
    }
    group.bench_function("deep_not_20", |b| {
        b.iter(|| converter.convert_str(black_box(&deep), 1))
    });

    group.bench_function("order_by", |b| {
        b.iter(|| converter.convert_order_by(black_box("-created_at,score,name")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_identifiers,
    bench_convert,
    bench_complex_filters,
);

criterion_main!(benches);
