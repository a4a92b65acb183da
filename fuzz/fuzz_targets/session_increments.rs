#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{MismatchPolicy, ParseSession, SessionConfig, TreeBuilderConfig, is_well_formed};

// First byte picks the mismatch policy and chunk size; the rest is the input.
fuzz_target!(|data: &[u8]| {
    let Some((&control, input)) = data.split_first() else {
        return;
    };
    let policy = match control % 3 {
        0 => MismatchPolicy::LiteralText,
        1 => MismatchPolicy::Discard,
        _ => MismatchPolicy::PopToMatch,
    };
    let chunk = usize::from(control >> 2).max(1);
    let config = SessionConfig {
        builder: TreeBuilderConfig {
            mismatch_policy: policy,
        },
        ..SessionConfig::default()
    };

    let mut chunked = ParseSession::new(config.clone());
    let mut was_finished = false;
    for piece in input.chunks(chunk) {
        chunked.push_bytes(piece);
        if policy != MismatchPolicy::LiteralText {
            let snapshot = chunked.snapshot();
            assert!(is_well_formed(&snapshot.markup), "{:?}", snapshot.markup);
        }
        let finished = chunked.is_finished();
        assert!(!was_finished || finished, "snapshot status flipped back");
        was_finished = finished;
    }
    let chunked = chunked.finish();

    let mut whole = ParseSession::new(config);
    whole.push_bytes(input);
    let whole = whole.finish();

    assert_eq!(chunked.snapshot, whole.snapshot, "chunking changed the document");
});
