//! Criterion benchmarks for logit

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use logit::prelude::*;
use std::sync::Arc;

/// Discards everything; isolates merge and encode cost from I/O
struct NullWriter;

impl WriteHandle for NullWriter {
    fn write_all(&self, buf: &[u8]) -> Result<()> {
        black_box(buf);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn destination(&self) -> &str {
        "null"
    }
}

fn null_factory() -> logit::WriterFactory {
    Arc::new(|_: &str, _: &str, _: &WriterOptions| -> Result<Arc<dyn WriteHandle>> {
        Ok(Arc::new(NullWriter))
    })
}

fn populated_scope(per_class: usize) -> LogScope {
    let scope = LogScope::new();
    for i in 0..per_class {
        scope.add_meta_field(format!("meta_{}", i), i as i64);
        scope.add_field(format!("normal_{}", i), "value");
        scope.add_level_field(LogLevel::Error, format!("err_{}", i), i as i64);
    }
    scope
}

// ============================================================================
// Merge Benchmarks
// ============================================================================

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    group.throughput(Throughput::Elements(1));

    for size in [0usize, 4, 16, 64] {
        let scope = populated_scope(size);
        group.bench_with_input(BenchmarkId::new("info", size), &scope, |b, scope| {
            b.iter(|| {
                black_box(scope.merge(LogLevel::Info, vec![Field::int("status", 200)]))
            });
        });
        group.bench_with_input(BenchmarkId::new("error", size), &scope, |b, scope| {
            b.iter(|| {
                black_box(scope.merge(LogLevel::Error, vec![Field::int("status", 500)]))
            });
        });
    }

    group.bench_function("detached", |b| {
        let scope = LogScope::detached();
        b.iter(|| {
            black_box(scope.merge(
                LogLevel::Info,
                vec![Field::int("a", 1), Field::int("b", 2), Field::int("a", 3)],
            ))
        });
    });

    group.finish();
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Elements(1));

    let entry = LogEntry::new(LogLevel::Info, "Request processed").with_fields(vec![
        Field::string("path", "/api/v1/orders"),
        Field::int("status", 200),
        Field::duration("latency", std::time::Duration::from_millis(12)),
        Field::bool("cached", false),
    ]);

    let json = default_encoder()();
    group.bench_function("json", |b| {
        b.iter(|| black_box(json.encode(black_box(&entry))));
    });

    let console = console_encoder(EncoderConfig::dispatch().with_colors(false))();
    group.bench_function("console", |b| {
        b.iter(|| black_box(console.encode(black_box(&entry))));
    });

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let rules = vec![
        DispatchRule::new("", [LogLevel::Debug, LogLevel::Info]),
        DispatchRule::new("wf", [LogLevel::Warn, LogLevel::Error]),
        DispatchRule::new("all", LogLevel::ALL),
    ];
    let (core, _shutdown) = build_dispatch_core(
        "never",
        "bench.log",
        &rules,
        Some(null_factory()),
        None,
        &WriterOptions::new(),
    )
    .expect("build core");
    let logger = Logger::builder()
        .core(Arc::new(core))
        .without_stacktrace()
        .add_caller(true)
        .build();
    let scope = populated_scope(8);

    group.bench_function("info_two_destinations", |b| {
        b.iter(|| logger.info(&scope, black_box("served"), vec![Field::int("status", 200)]));
    });

    group.bench_function("error_two_destinations", |b| {
        b.iter(|| logger.error(&scope, black_box("failed"), vec![Field::int("status", 500)]));
    });

    group.bench_function("flush_scope", |b| {
        b.iter(|| logger.flush(&scope));
    });

    group.finish();
}

fn bench_concurrent_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_emit");

    let (core, _shutdown) = build_dispatch_core(
        "never",
        "bench.log",
        &[DispatchRule::new("", LogLevel::ALL)],
        Some(null_factory()),
        None,
        &WriterOptions::new(),
    )
    .expect("build core");
    let logger = Arc::new(Logger::builder().core(Arc::new(core)).without_stacktrace().build());

    for threads in [2usize, 4] {
        group.throughput(Throughput::Elements((threads * 100) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let logger = Arc::clone(&logger);
                        std::thread::spawn(move || {
                            let scope = LogScope::new();
                            scope.add_meta_field("logid", 42);
                            for i in 0..100 {
                                logger.info(&scope, "tick", vec![Field::int("i", i)]);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_merge,
    bench_encoding,
    bench_dispatch,
    bench_concurrent_emit
);

criterion_main!(benches);
