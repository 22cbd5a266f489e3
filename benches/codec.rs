use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fountain::fec::{Decoder, Encoder, EncodingPlan};

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 + 17) as u8).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");
    for &len in &[64 * 1024usize, 1024 * 1024] {
        let data = payload(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            b.iter(|| Encoder::construct(data, 1024).unwrap());
        });
    }
    group.finish();
}

fn bench_encode_with_plan(c: &mut Criterion) {
    let len = 1024 * 1024;
    let data = payload(len);
    let plan = EncodingPlan::generate(len.div_ceil(1024)).unwrap();
    let mut group = c.benchmark_group("construct_with_plan");
    group.throughput(Throughput::Bytes(len as u64));
    group.bench_function(BenchmarkId::from_parameter(len), |b| {
        b.iter(|| Encoder::with_plan(&data, 1024, &plan).unwrap());
    });
    group.finish();
}

fn bench_repair(c: &mut Criterion) {
    let data = payload(256 * 1024);
    let enc = Encoder::construct(&data, 1024).unwrap();
    c.bench_function("repair_symbol", |b| {
        let first = enc.first_repair_esi();
        let mut n = 0u32;
        b.iter(|| {
            n = (n + 1) % 1_000_000;
            enc.get_symbol(first + n).unwrap()
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let data = payload(256 * 1024);
    let enc = Encoder::construct(&data, 1024).unwrap();
    let k = enc.source_symbols();
    let packets = enc.get_encoded_packets((k / 5) as u32 + 4);
    // lose every fifth source symbol
    let survivors: Vec<_> = packets
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i >= k || i % 5 != 0)
        .map(|(_, p)| p)
        .collect();

    c.bench_function("decode_20pct_loss", |b| {
        b.iter(|| {
            let mut dec = Decoder::with_info(enc.transmission_info()).unwrap();
            for p in survivors.iter().cloned() {
                if dec.decode(p).unwrap().is_some() {
                    break;
                }
            }
        });
    });
}

criterion_group!(codec_benches, bench_encode, bench_encode_with_plan, bench_repair, bench_decode);
criterion_main!(codec_benches);
