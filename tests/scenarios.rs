use mtgadiff::apply::apply;
use mtgadiff::codec::{self, PatchCodec};
use mtgadiff::diff::generate;
use mtgadiff::{PatchError, PatchSet};

fn encode(patch: &PatchSet) -> Vec<u8> {
    PatchCodec::default().encode_to_vec(patch).unwrap()
}

fn decode(bytes: &[u8]) -> Result<PatchSet, PatchError> {
    PatchCodec::default().decode_slice(bytes)
}

fn items(patch: &PatchSet) -> Vec<(u32, Vec<u8>)> {
    patch
        .items()
        .iter()
        .map(|i| (i.offset(), i.content().to_vec()))
        .collect()
}

const ORIGINAL_CHECKSUM: std::ops::Range<usize> = 14..46;
const PATCHED_CHECKSUM: std::ops::Range<usize> = 50..82;

#[test]
fn growth_scenario() {
    let original = [1u8, 2, 3];
    let modified = [1u8, 2, 3, 4, 5];
    let patch = generate(&original, &modified).unwrap();
    assert_eq!(items(&patch), vec![(3, vec![4, 5])]);
    assert_eq!(apply(&original, &patch).unwrap(), modified);
}

#[test]
fn shrink_scenario() {
    let original = [1u8, 2, 3, 4, 5];
    let modified = [1u8, 2, 3];
    let patch = generate(&original, &modified).unwrap();
    assert!(patch.items().is_empty());
    assert_eq!(patch.patched_len(), 3);
    assert_eq!(apply(&original, &patch).unwrap(), modified);
}

#[test]
fn interior_mismatch_scenario() {
    let patch = generate(&[0, 1, 2, 3, 4], &[0, 9, 9, 3, 4]).unwrap();
    assert_eq!(items(&patch), vec![(1, vec![9, 9])]);
}

#[test]
fn identity_shortcut() {
    let data = b"an unchanged build artifact".to_vec();
    let patch = generate(&data, &data).unwrap();
    assert!(patch.items().is_empty());
    assert_eq!(apply(&data, &patch).unwrap(), data);
}

#[test]
fn full_pipeline_through_bytes() {
    let original = b"MZ\x90\x00header-v1....payload-section-AAAA....trailer".to_vec();
    let modified = b"MZ\x90\x00header-v2....payload-section-BBBB....trailer+extra".to_vec();

    let patch = generate(&original, &modified).unwrap();
    let bytes = encode(&patch);
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, patch);
    assert_eq!(apply(&original, &decoded).unwrap(), modified);
}

#[test]
fn tampered_original_checksum_is_detected() {
    let original = b"original contents".to_vec();
    let modified = b"modified contents".to_vec();
    let bytes = encode(&generate(&original, &modified).unwrap());

    for byte in ORIGINAL_CHECKSUM {
        for bit in [0u8, 3, 7] {
            let mut tampered = bytes.clone();
            tampered[byte] ^= 1 << bit;
            let patch = decode(&tampered).unwrap();
            let err = apply(&original, &patch).unwrap_err();
            assert!(
                matches!(err, PatchError::OriginalChecksumMismatch { .. }),
                "byte {byte} bit {bit}: {err:?}"
            );
        }
    }
}

#[test]
fn tampered_patched_checksum_is_detected() {
    let original = b"original contents".to_vec();
    let modified = b"modified contents, longer".to_vec();
    let bytes = encode(&generate(&original, &modified).unwrap());

    for byte in PATCHED_CHECKSUM {
        let mut tampered = bytes.clone();
        tampered[byte] ^= 0x01;
        let patch = decode(&tampered).unwrap();
        let err = apply(&original, &patch).unwrap_err();
        assert!(
            matches!(err, PatchError::PatchedChecksumMismatch { .. }),
            "byte {byte}: {err:?}"
        );
    }
}

#[test]
fn tampered_content_is_detected() {
    let original = vec![0u8; 64];
    let mut modified = original.clone();
    modified[10..20].fill(0xAB);
    let mut bytes = encode(&generate(&original, &modified).unwrap());

    // First item content starts after header (86) + offset (4) + length (4).
    bytes[86 + 8] ^= 0xFF;
    let patch = decode(&bytes).unwrap();
    assert!(matches!(
        apply(&original, &patch),
        Err(PatchError::PatchedChecksumMismatch { .. })
    ));
}

#[test]
fn version_rejection() {
    let bytes = encode(&generate(b"abc", b"abd").unwrap());
    for (major, minor) in [(0x01, 0x01), (0x00, 0x00), (0x02, 0x00), (0x00, 0x01)] {
        let mut tampered = bytes.clone();
        tampered[8] = major;
        tampered[9] = minor;
        assert!(matches!(
            decode(&tampered),
            Err(PatchError::UnsupportedVersion { .. })
        ));
    }
}

#[test]
fn bad_magic_rejection() {
    let mut bytes = encode(&generate(b"abc", b"abd").unwrap());
    bytes[..8].copy_from_slice(b"BSDIFF40");
    assert!(matches!(
        decode(&bytes),
        Err(PatchError::MalformedFormat { .. })
    ));
}

#[test]
fn empty_inputs_are_rejected() {
    assert!(matches!(generate(b"", b"x"), Err(PatchError::EmptyInput)));
    assert!(matches!(generate(b"x", b""), Err(PatchError::EmptyInput)));
}

#[test]
fn patch_for_other_file_is_refused() {
    let patch = generate(b"first original", b"first modified").unwrap();
    assert!(matches!(
        apply(b"other original", &patch),
        Err(PatchError::OriginalChecksumMismatch { .. })
    ));
    assert!(matches!(
        apply(b"short", &patch),
        Err(PatchError::OriginalLengthMismatch { .. })
    ));
}

#[test]
fn convenience_functions_match_codec() {
    let patch = generate(b"0123456789", b"0123X56789").unwrap();
    let mut via_fn = Vec::new();
    codec::encode(&patch, &mut via_fn).unwrap();
    assert_eq!(via_fn, encode(&patch));
    assert_eq!(codec::decode(&mut via_fn.as_slice()).unwrap(), patch);
}
