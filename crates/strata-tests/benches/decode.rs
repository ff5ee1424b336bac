use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use strata_decoder::{FactoryRegistry, MemoryChunks, ResultSet, StructDecoder};
use strata_encoder::StructEncoder;
use strata_tests::{
    AllTypesClass, SimpleClass, all_types_schema, repeated_rows, sample_all_types, simple_schema,
};
use strata_types::RawValue;

fn decoder() -> StructDecoder {
    let registry = Arc::new(FactoryRegistry::new());
    registry.register(AllTypesClass::default);
    StructDecoder::new(registry)
}

fn bench_decode_simple(c: &mut Criterion) {
    let decoder = decoder();
    let schema = simple_schema("OBJ");
    let raw = StructEncoder::encode(&SimpleClass::new("a"), &schema).unwrap();

    c.bench_function("decode_simple", |b| {
        b.iter(|| decoder.decode::<SimpleClass>(&raw, &schema).unwrap());
    });
}

fn bench_decode_all_types(c: &mut Criterion) {
    let decoder = decoder();
    let schema = all_types_schema("OBJ");
    let raw = StructEncoder::encode(&sample_all_types(), &schema).unwrap();
    let text = RawValue::Text(raw.to_json_string());

    let mut group = c.benchmark_group("decode_all_types");

    group.bench_function("typed", |b| {
        b.iter(|| decoder.decode::<AllTypesClass>(&raw, &schema).unwrap());
    });
    group.bench_function("dynamic", |b| {
        b.iter(|| decoder.decode_value(&raw, &schema).unwrap());
    });
    group.bench_function("json_text_cell", |b| {
        b.iter(|| {
            let mut rs = ResultSet::new(
                vec![schema.clone()],
                decoder.clone(),
                MemoryChunks::new([vec![vec![text.clone()]]]),
            );
            rs.next().unwrap();
            rs.get_object::<AllTypesClass>(1).unwrap()
        });
    });

    group.finish();
}

fn bench_result_set(c: &mut Criterion) {
    let decoder = decoder();
    let schema = all_types_schema("OBJ");
    let rows = repeated_rows(&sample_all_types(), &schema, 10_000);

    let mut group = c.benchmark_group("result_set");
    group.throughput(Throughput::Elements(rows.len() as u64));

    for chunk_size in [100, 1000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("rows", chunk_size),
            &chunk_size,
            |b, &size| {
                b.iter(|| {
                    let mut rs = ResultSet::new(
                        vec![schema.clone()],
                        decoder.clone(),
                        MemoryChunks::split(rows.clone(), size),
                    );
                    let mut count = 0;
                    while rs.next().unwrap() {
                        rs.get_object::<AllTypesClass>(1).unwrap();
                        count += 1;
                    }
                    count
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_simple,
    bench_decode_all_types,
    bench_result_set
);
criterion_main!(benches);
