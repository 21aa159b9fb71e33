use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dnapng::alphabet::BASES;
use dnapng::{decode, encode, CodecConfig};

fn sequence(len: usize) -> String {
    (0..len).map(|i| BASES[(i * 7 + i / 3) % 4].as_char()).collect()
}

fn bench_codec(c: &mut Criterion) {
    let config = CodecConfig::default();
    let seq = sequence(100_000);
    let img = encode(&seq, &config).unwrap();

    c.bench_function("encode_100k", |b| {
        b.iter(|| encode(black_box(&seq), &config).unwrap())
    });
    c.bench_function("decode_100k", |b| {
        b.iter(|| decode(black_box(&img), &config).unwrap())
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
