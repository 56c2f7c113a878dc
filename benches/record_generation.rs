// Criterion benchmarks for record synthesis and in-memory batched writing

use std::io;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use synthrec::{BatchWriter, Filler, GeneratorConfig, RecordGenerator, WriterConfig};

const RECORDS: u64 = 100_000;

fn generator(record_size: usize, filler: Filler) -> RecordGenerator {
    RecordGenerator::new(GeneratorConfig {
        total_records: RECORDS,
        record_size,
        filler,
        ..GeneratorConfig::default()
    })
    .unwrap()
}

fn bench_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence");
    for record_size in [64usize, 256, 1024] {
        group.throughput(Throughput::Bytes(RECORDS * record_size as u64));
        for (name, filler) in [("repeat", Filler::Repeat(b'x')), ("seeded", Filler::Seeded(42))] {
            let gen = generator(record_size, filler);
            group.bench_with_input(BenchmarkId::new(name, record_size), &gen, |b, gen| {
                b.iter(|| {
                    let mut total = 0usize;
                    for record in gen.sequence() {
                        total += black_box(record).len();
                    }
                    total
                })
            });
        }
    }
    group.finish();
}

fn bench_batched_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("batched_write");
    let gen = generator(256, Filler::default());
    group.throughput(Throughput::Bytes(gen.total_bytes()));
    for batch_size in [100usize, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| {
                b.iter(|| {
                    let config = WriterConfig {
                        batch_size,
                        ..WriterConfig::default()
                    };
                    let mut writer =
                        BatchWriter::new(|_: usize| Ok::<_, io::Error>(io::sink()), config)
                            .unwrap();
                    writer.open().unwrap();
                    for batch in gen.batched_sequence(batch_size) {
                        writer.write_many(batch).unwrap();
                    }
                    writer.close().unwrap();
                    writer.written_records()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_sequence, bench_batched_write);
criterion_main!(benches);
