// Explicit open / write_many / close lifecycle with a custom progress observer

use anyhow::{Context, Result};
use synthrec::{
    BatchWriter, FileSink, Filler, GeneratorConfig, ProgressEvent, RecordGenerator, WriterConfig,
};

fn main() -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let total_records = 1_000_000;
    let batch_size = 50_000;

    let generator = RecordGenerator::new(GeneratorConfig {
        total_records,
        record_size: 128,
        batch_size,
        filler: Filler::Seeded(12345),
        ..GeneratorConfig::default()
    })?;

    let config = WriterConfig {
        batch_size,
        ..WriterConfig::default()
    };
    let mut writer = BatchWriter::new(FileSink::new("streaming_output.txt"), config)?
        .with_observer(|e: ProgressEvent| {
            println!(
                "written {:>9} records  {:>12.0} records/s",
                e.written,
                e.records_per_sec()
            );
        });

    writer.open().context("opening streaming_output.txt")?;
    for batch in generator.batched_sequence(batch_size) {
        writer.write_many(batch)?;
    }
    writer.close()?;

    println!(
        "Generated and wrote {} records ({} MB)",
        writer.written_records(),
        generator.total_bytes() / (1024 * 1024)
    );

    Ok(())
}
