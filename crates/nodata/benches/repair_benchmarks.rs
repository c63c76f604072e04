//! Repair performance benchmarks.
//!
//! Measures loading and the sentinel repair pass across dataset sizes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nodata::Cleaner;
use nodata::repair::RepairEngine;
use std::io::Write;
use tempfile::NamedTempFile;

/// Generate synthetic CSV data where every seventh numeric cell is -9999.
fn generate_csv_data(rows: usize, cols: usize) -> String {
    let mut data = String::new();

    let header: Vec<String> = (0..cols).map(|i| format!("column_{}", i + 1)).collect();
    data.push_str(&header.join(","));
    data.push('\n');

    for row in 0..rows {
        for col in 0..cols {
            if col > 0 {
                data.push(',');
            }
            match col % 4 {
                0 => data.push_str(&format!("ID_{:06}", row)),
                _ if (row + col) % 7 == 0 => data.push_str("-9999"),
                1 => data.push_str(&format!("{:.2}", row as f64 * 1.5)),
                2 => data.push_str(&format!("{}", row % 100)),
                3 => data.push_str(&format!("{:.3}", (row % 17) as f64 / 3.0)),
                _ => unreachable!(),
            }
        }
        data.push('\n');
    }

    data
}

fn temp_csv(data: &str) -> NamedTempFile {
    let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
    temp.write_all(data.as_bytes()).unwrap();
    temp
}

/// Benchmark load + sentinel detection.
fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_csv");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_csv_data(*rows, 10);
        group.throughput(Throughput::Bytes(data.len() as u64));

        let temp = temp_csv(&data);
        group.bench_with_input(BenchmarkId::new("rows", rows), &temp, |b, temp| {
            let cleaner = Cleaner::new();
            b.iter(|| black_box(cleaner.load(temp.path()).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the repair pass alone.
fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair");

    for rows in [100, 1_000, 10_000, 100_000].iter() {
        let temp = temp_csv(&generate_csv_data(*rows, 10));
        let loaded = Cleaner::new().load(temp.path()).unwrap();

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &loaded, |b, loaded| {
            let engine = RepairEngine::new();
            b.iter_with_setup(
                || loaded.dataset.clone(),
                |dataset| black_box(engine.repair(dataset, &loaded.numeric)),
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_repair);
criterion_main!(benches);
