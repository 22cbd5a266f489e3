//! Bit-exact vectors for the tuple generator and repair symbols.
//!
//! Any change here is a wire-incompatible change and must bump
//! `CODEBOOK_VERSION`.

use fountain::fec::{tuple_for, CodeParameters, Encoder, Tuple, CODEBOOK_VERSION};

fn params(k: usize) -> CodeParameters {
    CodeParameters::for_source_count(k).unwrap()
}

#[test]
fn codebook_version() {
    assert_eq!(CODEBOOK_VERSION, 1);
}

#[test]
fn tuples_for_smallest_block() {
    let p = params(10);
    let t = Tuple::new(&p, 10);
    assert_eq!((t.d, t.a, t.b, t.d1, t.a1, t.b1), (3, 14, 12, 3, 7, 8));
    assert_eq!(
        tuple_for(&p, 0),
        vec![(2, 1), (11, 1), (20, 1), (24, 1)]
    );
    assert_eq!(
        tuple_for(&p, 10),
        vec![(6, 1), (9, 1), (12, 1), (17, 1), (21, 1), (25, 1)]
    );
    assert_eq!(
        tuple_for(&p, 11),
        vec![(0, 1), (13, 1), (15, 1), (17, 1), (22, 1)]
    );
    assert_eq!(
        tuple_for(&p, 1000),
        vec![(5, 1), (15, 1), (18, 1), (23, 1), (25, 1)]
    );
}

#[test]
fn tuples_for_mid_block() {
    let p = params(150);
    let t = Tuple::new(&p, 0);
    assert_eq!((t.d, t.a, t.b, t.d1, t.a1, t.b1), (4, 143, 135, 2, 7, 7));
    assert_eq!(tuple_for(&p, 1), vec![(16, 1), (49, 1), (173, 1), (180, 1)]);
    assert_eq!(
        tuple_for(&p, 150),
        vec![(133, 1), (141, 1), (149, 1), (176, 1), (178, 1)]
    );
    assert_eq!(tuple_for(&p, 151), vec![(33, 1), (175, 1), (180, 1)]);
    assert_eq!(
        tuple_for(&p, 1000),
        vec![(56, 1), (73, 1), (134, 1), (151, 1), (168, 1), (174, 1), (181, 1)]
    );
}

#[test]
fn repair_symbols_are_stable() {
    let payload: Vec<u8> = (0..40u32).map(|i| ((i * 37 + 11) % 256) as u8).collect();
    let enc = Encoder::construct(&payload, 4).unwrap();
    let hex_of = |esi: u32| hex::encode(enc.get_symbol(esi).unwrap().as_bytes());
    assert_eq!(hex_of(0), "0b30557a");
    assert_eq!(hex_of(3), "c7ec1136");
    assert_eq!(hex_of(10), "b6462adc");
    assert_eq!(hex_of(11), "86e4adb4");
    assert_eq!(hex_of(12), "5fa459a5");
    assert_eq!(hex_of(100), "7c570dec");
}
