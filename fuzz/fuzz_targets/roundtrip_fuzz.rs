#![no_main]
use libfuzzer_sys::fuzz_target;
use mtgadiff::apply::apply;
use mtgadiff::codec::PatchCodec;
use mtgadiff::diff::{self, DiffOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let chunk_size = 1 + data[0] as usize;
    let split = 2 + (data[1] as usize % (data.len() - 2));
    let original = &data[2..split];
    let modified = &data[split..];
    if original.is_empty() || modified.is_empty() {
        return;
    }

    let patch = diff::generate(original, modified).unwrap();
    let chunked = diff::generate_with(
        original,
        modified,
        &DiffOptions {
            parallel: true,
            chunk_size,
        },
    )
    .unwrap();
    assert_eq!(chunked, patch);

    let codec = PatchCodec::default();
    let bytes = codec.encode_to_vec(&patch).unwrap();
    let decoded = codec.decode_slice(&bytes).unwrap();
    assert_eq!(decoded, patch);
    assert_eq!(apply(original, &decoded).unwrap(), modified);
});
