use criterion::{Criterion, Throughput};
use std::hint::black_box;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rawpost::{Payload, Response, decode_chunked};

const BODY_LEN: usize = 64 * 1024;

fn random_body(seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..BODY_LEN).map(|_| rng.r#gen()).collect()
}

/// Frames `body` as chunks of pseudo-random size up to 4 KiB.
fn chunked(body: &[u8], seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(body.len() + body.len() / 64);
    let mut rest = body;
    while !rest.is_empty() {
        let n = rng.gen_range(1..=rest.len().min(4096));
        out.extend_from_slice(format!("{n:x}\r\n").as_bytes());
        out.extend_from_slice(&rest[..n]);
        out.extend_from_slice(b"\r\n");
        rest = &rest[n..];
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

pub fn bench_decode_chunked(c: &mut Criterion) {
    let body = random_body(1);
    let encoded = chunked(&body, 2);

    let mut group = c.benchmark_group("decode_chunked");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("64k", |b| {
        b.iter(|| decode_chunked(black_box(&encoded)).expect("Failed to decode"))
    });
    group.finish();
}

pub fn bench_parse_plain(c: &mut Criterion) {
    let body = random_body(3);
    let mut raw = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .into_bytes();
    raw.extend_from_slice(&body);

    let mut group = c.benchmark_group("parse_response");
    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("plain", |b| {
        b.iter(|| Response::parse(black_box(&raw)).expect("Failed to parse"))
    });
    group.finish();
}

pub fn bench_parse_chunked(c: &mut Criterion) {
    let body = random_body(4);
    let mut raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    raw.extend_from_slice(&chunked(&body, 5));

    let mut group = c.benchmark_group("parse_response");
    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("chunked", |b| {
        b.iter(|| Response::parse(black_box(&raw)).expect("Failed to parse"))
    });
    group.finish();
}

pub fn bench_encode_form(c: &mut Criterion) {
    let payload = Payload::pairs(
        (0..100).map(|i| (format!("field {i}"), format!("value & more/{i}"))),
    );

    let mut group = c.benchmark_group("encode");
    group.bench_function("form_100_pairs", |b| b.iter(|| black_box(&payload).encode()));
    group.finish();
}
