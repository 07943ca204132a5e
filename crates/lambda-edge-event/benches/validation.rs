//! Benchmarks for event construction and payload validation.

use criterion::{Criterion, criterion_group, criterion_main};
use lambda_edge_event::graph::SharedValue;
use lambda_edge_event::{
    RequestEventBuilder, ResponseEventBuilder, validate_request, validate_request_origin,
    validate_response,
};
use std::hint::black_box;

fn origin_request() -> RequestEventBuilder {
    let mut builder = RequestEventBuilder::origin_request();
    builder
        .uri("/images/logo.png")
        .request_header("Host", "example.org")
        .request_header("Accept", "image/webp,*/*")
        .custom_origin("origin.example.org", "/")
        .and_then(|b| b.origin_read_timeout(30))
        .and_then(|b| b.origin_ssl_protocols(["TLSv1.1", "TLSv1.2"]))
        .unwrap();
    builder
}

fn bench_build_event(c: &mut Criterion) {
    c.bench_function("EventBuilder::to_value", |b| {
        b.iter(|| black_box(origin_request()).to_value().unwrap())
    });
}

fn bench_validate_request(c: &mut Criterion) {
    let event = origin_request().to_value().unwrap();
    let request = &event["Records"][0]["cf"]["request"];

    c.bench_function("validate_request", |b| {
        b.iter(|| validate_request(black_box(request)).unwrap())
    });
    c.bench_function("validate_request_origin", |b| {
        b.iter(|| validate_request_origin(black_box(request)).unwrap())
    });
}

fn bench_validate_response(c: &mut Criterion) {
    let mut builder = ResponseEventBuilder::viewer_response();
    builder
        .status(301)
        .response_header("Location", "https://example.org/");
    let event = builder.to_value().unwrap();
    let response = &event["Records"][0]["cf"]["response"];

    c.bench_function("validate_response", |b| {
        b.iter(|| validate_response(black_box(response)).unwrap())
    });
}

fn bench_deep_clone(c: &mut Criterion) {
    let graph = SharedValue::from_json(&origin_request().to_value().unwrap());
    graph.set("self", graph.clone());

    c.bench_function("SharedValue::deep_clone", |b| {
        b.iter(|| {
            let copy = black_box(&graph).deep_clone();
            copy.clear();
        })
    });
    graph.clear();
}

criterion_group!(
    benches,
    bench_build_event,
    bench_validate_request,
    bench_validate_response,
    bench_deep_clone,
);
criterion_main!(benches);
