use fanowire::pipeline::{
    build_code_table, channel_rng, compress, decompress, inject_errors, pack, unpack,
    HadamardMatrix, OrthogonalCodec,
};
use fanowire::BitString;
use proptest::prelude::*;
use proptest::sample::subsequence;

proptest! {
    #[test]
    fn fano_roundtrip(data in proptest::collection::vec(any::<u8>(), 1..512)) {
        let table = build_code_table(&data);
        let bits = compress(&data, &table).unwrap();
        prop_assert_eq!(decompress(&bits, &table), data);
    }

    #[test]
    fn fano_skewed_roundtrip(data in proptest::collection::vec(0u8..4, 1..512)) {
        let table = build_code_table(&data);
        let bits = compress(&data, &table).unwrap();
        prop_assert_eq!(decompress(&bits, &table), data);
    }

    #[test]
    fn fano_table_is_prefix_free(data in proptest::collection::vec(any::<u8>(), 2..512)) {
        let table = build_code_table(&data);
        prop_assume!(table.len() >= 2);
        prop_assert!(table.is_prefix_free());
        prop_assert!(table.iter().all(|(_, code)| !code.is_empty()));
    }

    #[test]
    fn pack_unpack_restores_byte_aligned_bits(
        bytes in proptest::collection::vec(any::<u8>(), 0..64),
        block in 1usize..=255,
    ) {
        let bits = BitString::from_bytes(&bytes);
        let packed = pack(&bits, block).unwrap();
        prop_assert_eq!(packed.len() % block, 0);
        let unpacked = unpack(&packed);
        prop_assert!(unpacked.padding_intact);
        prop_assert_eq!(unpacked.bits, bits);
    }

    #[test]
    fn corrects_up_to_radius_for_n7(
        payload in 0u64..128,
        flips in subsequence((0..128usize).collect::<Vec<_>>(), 0..=31),
    ) {
        let codec = OrthogonalCodec::new(7).unwrap();
        let payload_bits = BitString::from_value(payload, 7);
        let mut received = codec.encode_block(&payload_bits).unwrap();
        for &pos in &flips {
            received.flip(pos);
        }
        let decoded = codec.decode_block(&received).unwrap();
        prop_assert_eq!(decoded, payload_bits);
    }

    #[test]
    fn stream_roundtrip(bits in proptest::collection::vec(any::<bool>(), 0..300), n in 1usize..=8) {
        let codec = OrthogonalCodec::new(n).unwrap();
        let input = BitString::from(bits);
        let (encoded, params) = codec.encode(&input);
        prop_assert_eq!(encoded.len() % codec.code_length(), 0);
        let decoded = codec.decode(&encoded, &params).unwrap();
        prop_assert_eq!(decoded.bits, input);
        prop_assert_eq!(decoded.errors_corrected, 0);
    }

    #[test]
    fn slices_match_bitwise_view(
        bits in proptest::collection::vec(any::<bool>(), 0..300),
        start in 0usize..300,
        span in 0usize..300,
    ) {
        let packed = BitString::from(bits.clone());
        let end = (start + span).min(bits.len());
        let start = start.min(end);
        let expected: Vec<bool> = bits[start..end].to_vec();
        prop_assert_eq!(packed.slice(start, end), BitString::from(expected.clone()));
        prop_assert_eq!(packed.slice(start, end).iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn append_matches_concatenation(
        left in proptest::collection::vec(any::<bool>(), 0..200),
        right in proptest::collection::vec(any::<bool>(), 0..200),
    ) {
        let mut joined = BitString::from(left.clone());
        joined.append(&BitString::from(right.clone()));
        let expected: Vec<bool> = left.into_iter().chain(right).collect();
        prop_assert_eq!(joined.iter().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(joined, BitString::from(expected));
    }

    #[test]
    fn injected_flips_match_distance(
        bytes in proptest::collection::vec(any::<u8>(), 1..64),
        pct in 0.0f64..=100.0,
        seed in any::<u64>(),
    ) {
        let bits = BitString::from_bytes(&bytes);
        let (noisy, flips) = inject_errors(&bits, pct, &mut channel_rng(Some(seed)));
        prop_assert_eq!(flips, (bits.len() as f64 * pct / 100.0).floor() as usize);
        prop_assert_eq!(noisy.hamming_distance(&bits), flips);
    }
}

#[test]
fn hadamard_rows_differ_in_half_their_positions() {
    for n in 1..=8 {
        let matrix = HadamardMatrix::sylvester(n);
        let size = 1usize << n;
        assert_eq!(matrix.order(), size);
        for i in 0..size {
            assert_eq!(matrix.row(i).len(), size);
            for j in (i + 1)..size {
                assert_eq!(
                    matrix.row(i).hamming_distance(matrix.row(j)),
                    size / 2,
                    "n = {}, rows {} and {}",
                    n,
                    i,
                    j
                );
            }
        }
    }
}

#[test]
fn every_payload_decodes_cleanly() {
    for n in 1..=8 {
        let codec = OrthogonalCodec::new(n).unwrap();
        for value in 0..(1u64 << n) {
            let payload = BitString::from_value(value, n);
            let codeword = codec.encode_block(&payload).unwrap();
            assert_eq!(codec.decode_block(&codeword).unwrap(), payload, "n = {}", n);
        }
    }
}

#[test]
fn injection_boundaries() {
    let bits = BitString::from_bytes(b"boundary");
    let (same, zero) = inject_errors(&bits, 0.0, &mut channel_rng(Some(1)));
    assert_eq!(same, bits);
    assert_eq!(zero, 0);

    let (flipped, all) = inject_errors(&bits, 100.0, &mut channel_rng(Some(1)));
    assert_eq!(all, bits.len());
    assert_eq!(flipped.hamming_distance(&bits), bits.len());
}

#[test]
fn empty_input_laws() {
    let table = build_code_table(b"");
    assert!(table.is_empty());
    assert!(compress(b"", &table).unwrap().is_empty());
    assert!(decompress(&BitString::new(), &table).is_empty());
}
