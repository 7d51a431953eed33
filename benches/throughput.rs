//! Throughput Benchmark for comments-service
//!
//! This benchmark measures request parsing, pagination and statement
//! execution against the in-memory engine.

use comments_service::comments::{decode_rows, paginate, CreateContext, ListContext, QueryBuilder};
use comments_service::protocol::{parse_request, HttpParser};
use comments_service::storage::StorageEngine;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn seed(engine: &StorageEngine, entity: &str, count: i64) {
    for i in 0..count {
        let ctx = CreateContext {
            entity: entity.to_string(),
            author: "bench".to_string(),
            created_by: i,
            text: format!("comment body number {}", i),
        };
        engine
            .apply(&QueryBuilder::create(&ctx, Uuid::new_v4(), i))
            .unwrap();
    }
}

/// Benchmark request parsing
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    let list = b"GET /comments HTTP/1.1\r\nHost: localhost\r\nEntity: post-1\r\nPagination-Page: 3\r\nPagination-Per-Page: 25\r\n\r\n";
    group.bench_function("list_request", |b| {
        b.iter(|| black_box(parse_request(black_box(list)).unwrap()));
    });

    let body = format!(r#"{{"text":"{}"}}"#, "x".repeat(1024));
    let make = format!(
        "POST /comments/make HTTP/1.1\r\nAuthor: bench\r\nEntity: post-1\r\nCreated_by: 1\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let parser = HttpParser::new();
    group.bench_function("make_request_1kb", |b| {
        b.iter(|| black_box(parser.parse(black_box(make.as_bytes())).unwrap()));
    });

    group.finish();
}

/// Benchmark pagination
fn bench_paginate(c: &mut Criterion) {
    let rows: Vec<u64> = (0..10_000).collect();

    let mut group = c.benchmark_group("paginate");

    group.bench_function("first_page", |b| {
        b.iter(|| black_box(paginate(rows.clone(), 1, 100)));
    });

    group.bench_function("last_page", |b| {
        b.iter(|| black_box(paginate(rows.clone(), 100, 100)));
    });

    group.finish();
}

/// Benchmark the list path: select, decode, paginate
fn bench_list(c: &mut Criterion) {
    let engine = Arc::new(StorageEngine::new());
    seed(&engine, "small", 10);
    seed(&engine, "large", 5_000);

    let mut group = c.benchmark_group("list");
    group.measurement_time(Duration::from_secs(10));

    for entity in ["small", "large"] {
        let ctx = ListContext {
            entity: entity.to_string(),
            page: 1,
            per_page: 20,
        };
        let statement = QueryBuilder::list(&ctx);

        group.bench_function(entity, |b| {
            b.iter(|| {
                let result = engine.apply(&statement).unwrap();
                black_box(paginate(decode_rows(&result), ctx.page, ctx.per_page));
            });
        });
    }

    group.finish();
}

/// Benchmark inserts
fn bench_create(c: &mut Criterion) {
    let engine = Arc::new(StorageEngine::new());

    let mut group = c.benchmark_group("create");
    group.throughput(Throughput::Elements(1));

    let ctx = CreateContext {
        entity: "post-1".to_string(),
        author: "bench".to_string(),
        created_by: 1,
        text: "small comment".to_string(),
    };
    group.bench_function("insert", |b| {
        let mut i = 0i64;
        b.iter(|| {
            engine
                .apply(&QueryBuilder::create(&ctx, Uuid::new_v4(), i))
                .unwrap();
            i += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_paginate, bench_list, bench_create);

criterion_main!(benches);
