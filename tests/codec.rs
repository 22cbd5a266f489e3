use fountain::fec::{DecodeStatus, Decoder, DecoderState, EncodingPacket, Encoder};
use fountain::FountainError;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

static PAYLOAD: Lazy<Vec<u8>> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(0xf0f0);
    (0..10_000).map(|_| rng.gen()).collect()
});

fn feed(dec: &mut Decoder, packets: &[EncodingPacket]) -> Option<Vec<u8>> {
    for p in packets {
        if let Some(out) = dec.decode(p.clone()).unwrap() {
            return Some(out);
        }
    }
    None
}

#[test]
fn round_trip_without_loss() {
    for (len, t) in [(1usize, 1usize), (7, 3), (1000, 100), (4097, 64), (10_000, 1400)] {
        let data = &PAYLOAD[..len];
        let enc = Encoder::construct(data, t).unwrap();
        let mut dec = Decoder::new(len as u64, t).unwrap();
        let out = feed(&mut dec, &enc.get_encoded_packets(4)).unwrap();
        assert_eq!(out, data, "len {len} T {t}");
    }
}

#[test]
fn round_trip_with_random_loss() {
    let mut rng = StdRng::seed_from_u64(42);
    for (len, t) in [(2_000usize, 50usize), (10_000, 64), (10_000, 25)] {
        let data = &PAYLOAD[..len];
        let enc = Encoder::construct(data, t).unwrap();
        let k = enc.source_symbols();
        let k_prime = enc.params().k_prime;
        let mut within_two = 0;
        let trials = 10;
        for _ in 0..trials {
            let mut packets = enc.get_encoded_packets(k as u32);
            packets.shuffle(&mut rng);
            let mut dec = Decoder::with_info(enc.transmission_info()).unwrap();
            let out = feed(&mut dec, &packets).unwrap();
            assert_eq!(out, data);
            // padding rows count towards K'
            if dec.received_count() + (k_prime - k) <= k_prime + 2 {
                within_two += 1;
            }
        }
        assert!(within_two >= trials - 1, "K={k}: {within_two}/{trials}");
    }
}

#[test]
fn order_does_not_matter() {
    let data = &PAYLOAD[..3000];
    let enc = Encoder::construct(data, 40).unwrap();
    let k = enc.source_symbols();
    let mut rng = StdRng::seed_from_u64(5);
    let mut survivors = enc.get_encoded_packets(30);
    survivors.shuffle(&mut rng);
    survivors.truncate(k + 3);

    let mut outcomes = Vec::new();
    for seed in 0..4 {
        let mut order = survivors.clone();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut dec = Decoder::with_info(enc.transmission_info()).unwrap();
        for p in order {
            dec.decode(p).unwrap();
        }
        outcomes.push((dec.state(), dec.payload().map(<[u8]>::to_vec)));
    }
    assert!(outcomes.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(outcomes[0].1.as_deref(), Some(data));
}

#[test]
fn duplicate_symbols_do_not_change_outcome() {
    let data = &PAYLOAD[..1500];
    let enc = Encoder::construct(data, 30).unwrap();
    let mut packets = enc.get_encoded_packets(20);
    packets.drain(..10);

    let mut once = Decoder::with_info(enc.transmission_info()).unwrap();
    let mut twice = Decoder::with_info(enc.transmission_info()).unwrap();
    let mut a = None;
    let mut b = None;
    for p in &packets {
        if a.is_none() {
            a = once.decode(p.clone()).unwrap();
        }
        if b.is_none() {
            b = twice.decode(p.clone()).unwrap();
        }
        if b.is_none() {
            assert_eq!(
                twice.add_symbol(p.esi(), &p.data).unwrap(),
                DecodeStatus::Keep
            );
        }
    }
    assert_eq!(a, b);
    assert_eq!(once.received_count(), twice.received_count());
    assert_eq!(a.as_deref(), Some(data));
}

#[test]
fn systematic_prefix_is_the_source() {
    let data = &PAYLOAD[..999];
    let enc = Encoder::construct(data, 100).unwrap();
    let mut padded = data.to_vec();
    padded.resize(1000, 0);
    for (esi, chunk) in padded.chunks(100).enumerate() {
        assert_eq!(enc.get_symbol(esi as u32).unwrap().as_bytes(), chunk);
    }
}

#[test]
fn fewer_than_k_symbols_never_decode() {
    let data = &PAYLOAD[..5000];
    let enc = Encoder::construct(data, 50).unwrap();
    let k = enc.source_symbols();
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..5 {
        let mut packets = enc.get_encoded_packets(k as u32);
        packets.shuffle(&mut rng);
        let mut dec = Decoder::with_info(enc.transmission_info()).unwrap();
        assert!(feed(&mut dec, &packets[..k - 1]).is_none());
        assert_ne!(dec.state(), DecoderState::Decoded);
    }
}

#[test]
fn ten_thousand_bytes_over_fourteen_hundred() {
    let data = PAYLOAD.as_slice();
    let enc = Encoder::construct(data, 1400).unwrap();
    let k = enc.source_symbols();
    let k_prime = enc.params().k_prime;
    assert_eq!(k, 8);

    let mut packets = enc.get_encoded_packets(15);
    assert_eq!(packets.len(), 23);
    assert_eq!(packets[8].esi(), k_prime as u32);
    let mut rng = StdRng::seed_from_u64(2024);
    packets.shuffle(&mut rng);
    packets.truncate(13);

    let mut dec = Decoder::new(data.len() as u64, 1400).unwrap();
    let mut decoded_at = None;
    for (i, p) in packets.into_iter().enumerate() {
        let rows = i + 1 + (k_prime - k);
        match dec.decode(p).unwrap() {
            Some(out) => {
                assert!(rows >= k_prime);
                assert_eq!(out, data);
                decoded_at.get_or_insert(i + 1);
            }
            None => assert!(decoded_at.is_none()),
        }
    }
    assert!(decoded_at.unwrap() >= k);
}

#[test]
fn bad_symbols_are_isolated() {
    let data = &PAYLOAD[..640];
    let enc = Encoder::construct(data, 64).unwrap();
    let mut dec = Decoder::with_info(enc.transmission_info()).unwrap();
    let packets = enc.get_encoded_packets(4);
    for (i, p) in packets.iter().enumerate() {
        if i % 3 == 0 {
            let err = dec.add_symbol(p.esi(), &p.data[..32]).unwrap_err();
            assert!(matches!(err, FountainError::MismatchedParameters(_)));
        }
        if let Some(out) = dec.decode(p.clone()).unwrap() {
            assert_eq!(out, data);
            return;
        }
    }
    panic!("block was not recovered");
}

#[test]
fn framed_bytes_round_trip() {
    let data = &PAYLOAD[..777];
    let enc = Encoder::construct(data, 32).unwrap();
    let mut dec = Decoder::with_info(enc.transmission_info()).unwrap();
    let mut out = None;
    for p in enc.get_encoded_packets(6).into_iter().skip(2) {
        if let Some(payload) = dec.decode_bytes(&p.to_bytes()).unwrap() {
            out = Some(payload);
        }
    }
    assert_eq!(out.as_deref(), Some(data));
    assert!(matches!(
        dec.decode_bytes(&[0, 1]),
        Err(FountainError::MalformedPacket(_))
    ));
}
