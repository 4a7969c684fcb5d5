//! Benchmarks for inference, coercion and full batch assembly
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::json;

use ddb_lake_core::catalog::InMemoryCatalog;
use ddb_lake_core::coercion::SchemaCoercer;
use ddb_lake_core::flatten::{FlatValue, RawColumn, RawRecord, RawTable, Scalar};
use ddb_lake_core::inference::{SchemaInferrer, parse_datetime_str};
use ddb_lake_core::pipeline::{BatchAssembler, PipelineConfig};
use ddb_lake_core::schema::TypeTag;

/// Generate scanned items in the store's typed-attribute format
fn generate_items(count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let item = json!({
                "id": {"S": format!("order-{}", i)},
                "customerId": {"S": format!("cust-{}", i % 97)},
                "total": {"N": format!("{}.{:02}", 10 + i % 500, i % 100)},
                "quantity": {"N": (i % 12).to_string()},
                "paid": {"BOOL": i % 3 == 0},
                "createdDate": {"S": "2024-07-30 18:27:00"},
                "updatedAt": {"N": (1_700_000_000 + i as i64 * 60).to_string()},
                "lines": {"L": [
                    {"M": {"sku": {"S": "A-1"}, "qty": {"N": "1"}}},
                    {"M": {"sku": {"S": "B-2"}, "qty": {"N": "2"}}}
                ]}
            });
            item.as_object().cloned().unwrap_or_default()
        })
        .collect()
}

fn text_column(name: &str, count: usize, value: impl Fn(usize) -> String) -> RawColumn {
    RawColumn::new(
        name,
        (0..count)
            .map(|i| FlatValue::new(Scalar::Text(value(i))))
            .collect(),
    )
}

/// Benchmark date parsing for each supported format
fn bench_date_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("date_parsing");

    let test_cases = vec![
        ("epoch_seconds", "1627765200"),
        ("epoch_millis", "1627765200000"),
        ("iso8601", "2024-07-30T18:27:00+02:00"),
        ("us_meridian", "7/30/2024 6:27:00 PM"),
        ("day_first", "30-07-2024 18:27:00"),
        ("unparseable", "not a date"),
    ];

    for (name, value) in test_cases {
        group.bench_with_input(BenchmarkId::new("parse", name), &value, |b, value| {
            b.iter(|| black_box(parse_datetime_str(value)));
        });
    }

    group.finish();
}

/// Benchmark inference and coercion of single columns
fn bench_columns(c: &mut Criterion) {
    let mut group = c.benchmark_group("columns");

    for count in [100, 1_000, 10_000].iter() {
        let ints = text_column("quantity", *count, |i| (i % 1000).to_string());
        let dates = text_column("created", *count, |i| format!("2024-07-{:02} 10:00:00", i % 28 + 1));
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::new("infer_int", count), &ints, |b, column| {
            let inferrer = SchemaInferrer::new();
            b.iter(|| black_box(inferrer.infer_column(&column.name, &column.values)));
        });

        group.bench_with_input(BenchmarkId::new("coerce_timestamp", count), &dates, |b, column| {
            let coercer = SchemaCoercer::new();
            b.iter(|| black_box(coercer.coerce_column(column, TypeTag::Timestamp)));
        });

        let mut table = RawTable::new();
        table.push_column(ints.clone());
        group.bench_with_input(BenchmarkId::new("infer_table", count), &table, |b, table| {
            let inferrer = SchemaInferrer::new();
            b.iter(|| black_box(inferrer.infer_table(table)));
        });
    }

    group.finish();
}

/// Benchmark full batch assembly with an inferred schema
fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");

    for count in [10, 100, 1_000].iter() {
        let records = generate_items(*count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::new("auto_schema", count), &records, |b, records| {
            let config = PipelineConfig::new("orders", "id").with_auto_schema(true);
            let assembler = match BatchAssembler::new(config, InMemoryCatalog::new()) {
                Ok(assembler) => assembler,
                Err(e) => panic!("invalid benchmark config: {e}"),
            };
            b.iter(|| black_box(assembler.assemble(records)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_date_parsing, bench_columns, bench_assembly);
criterion_main!(benches);
