use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    network::application::http::client::bench_decode_chunked,
    network::application::http::client::bench_parse_plain,
    network::application::http::client::bench_parse_chunked,
    network::application::http::client::bench_encode_form
);
criterion_main!(benches);
