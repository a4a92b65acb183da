//! Streaming parity: any split of an input must end in the same document as
//! the whole input pushed at once.
//!
//! Fast CI mode: default seeds and budget when `CI` is set.
//! Extended local mode: set `TAGSTREAM_PARITY_SEEDS` and
//! `TAGSTREAM_PARITY_BUDGET` to increase coverage.

use crate::chunker::{BoundaryPolicy, ChunkPlanCase, build_chunk_plans};
use crate::session::{ParseSession, SessionConfig};
use crate::shared::{ParseError, ParseErrorCode};
use crate::snapshot::{Snapshot, SnapshotStatus, is_well_formed};
use crate::tree_builder::{MismatchPolicy, TreeBuilderConfig};

const DEFAULT_BUDGET_CI: usize = 400;
const DEFAULT_BUDGET_LOCAL: usize = 2_000;
const DEFAULT_SEEDS_CI: usize = 16;
const DEFAULT_SEEDS_LOCAL: usize = 64;
const SEED_MIX: u64 = 0x9e3779b97f4a7c15;

const WELL_FORMED: &[&str] = &[
    "<top>\t<foo> TEXT</foo>But  not  here</top>",
    "<foo><bar><baz>BarText</baz></bar>Some other text</foo>",
    "<a>  lead <b/> mid  <c> in </c>  trail  </a>",
    "<?xml version?>\n<doc>\n  <p>Grüße, 世界</p>\n  <p>🌍 x</p>\n</doc>\n",
    "<r><s >x</s ><t />y<?pi a>b?>z</r>",
];

const MALFORMED: &[&str] = &[
    "<a><b>x</a>y</b></a>",
    "stray <> text<r>< r>x</ ></r>tail<again>gone</again>",
    "<r>unclosed <s>deep",
    "<r>dangling</r",
    "<a>x</b>y</a>",
    "<r><>x</r>",
    "<a><b>x</a>",
    "<r>a</r><s></x></s><t>b</t>",
];

#[test]
fn streaming_parity_final_snapshot_matches_whole_input() {
    let seeds = seed_count();
    let budget = run_budget();
    let inputs: Vec<&str> = WELL_FORMED.iter().chain(MALFORMED).copied().collect();
    assert!(
        budget >= inputs.len(),
        "streaming parity budget must be >= number of cases; increase TAGSTREAM_PARITY_BUDGET"
    );
    let case_budget = (budget / inputs.len()).max(1);

    for (case_idx, input) in inputs.iter().enumerate() {
        let expected = run_whole(input, MismatchPolicy::default());
        let base_seed = 0x7461_6773_7472_6561 ^ case_idx as u64;
        let mut remaining = case_budget;
        for policy in [BoundaryPolicy::Utf8Aligned, BoundaryPolicy::ByteStream] {
            for case in build_chunk_plans(input, seeds, base_seed ^ SEED_MIX, policy) {
                if remaining == 0 {
                    break;
                }
                let actual = run_plan(input, &case, MismatchPolicy::default());
                assert_eq!(
                    actual.snapshot, expected.snapshot,
                    "case={case_idx} {} chunks={:?}",
                    case.label,
                    case.plan.byte_chunks(input)
                );
                assert_eq!(
                    actual.errors, expected.errors,
                    "case={case_idx} {}",
                    case.label
                );
                remaining -= 1;
            }
        }
    }
}

#[test]
fn streaming_parity_holds_for_every_mismatch_policy() {
    let input = "<a><b><c>x</b>y</zz> z</a>";
    for policy in [
        MismatchPolicy::LiteralText,
        MismatchPolicy::Discard,
        MismatchPolicy::PopToMatch,
    ] {
        let expected = run_whole(input, policy);
        for case in build_chunk_plans(input, 8, 0x51, BoundaryPolicy::Utf8Aligned) {
            let actual = run_plan(input, &case, policy);
            assert_eq!(actual.snapshot, expected.snapshot, "{policy:?} {}", case.label);
        }
    }
}

#[test]
fn every_increment_renders_well_formed_and_finish_never_flips_back() {
    for input in WELL_FORMED {
        for case in build_chunk_plans(input, 4, 0xfeed, BoundaryPolicy::Utf8Aligned) {
            let run = run_plan(input, &case, MismatchPolicy::default());
            let seen_finished = assert_increments_well_formed(input, &case, &run);
            assert!(seen_finished, "{input:?} {}", case.label);
        }
    }
}

#[test]
fn malformed_input_still_renders_well_formed_increments() {
    for policy in [MismatchPolicy::Discard, MismatchPolicy::PopToMatch] {
        for input in MALFORMED {
            for case in build_chunk_plans(input, 4, 0xbad, BoundaryPolicy::ByteStream) {
                let run = run_plan(input, &case, policy);
                assert_increments_well_formed(input, &case, &run);
                assert!(
                    is_well_formed(&run.snapshot.markup),
                    "{policy:?} {input:?} {} final {:?}",
                    case.label,
                    run.snapshot.markup
                );
            }
        }
    }
}

#[test]
fn literal_text_policy_breaks_nesting() {
    let run = run_whole("<a>x</b>y</a>", MismatchPolicy::LiteralText);
    assert_eq!(run.snapshot.markup, "<a>x</b>y</a>");
    assert!(!is_well_formed(&run.snapshot.markup));
}

struct Run {
    snapshot: Snapshot,
    /// Errors that do not depend on how text was split.
    errors: Vec<ParseError>,
    increments: Vec<Snapshot>,
}

fn session(policy: MismatchPolicy) -> ParseSession {
    ParseSession::new(SessionConfig {
        builder: TreeBuilderConfig {
            mismatch_policy: policy,
        },
        ..SessionConfig::default()
    })
}

fn run_whole(input: &str, policy: MismatchPolicy) -> Run {
    let mut session = session(policy);
    session.push_str(input);
    let increments = vec![session.snapshot()];
    into_run(session, increments)
}

fn run_plan(input: &str, case: &ChunkPlanCase, policy: MismatchPolicy) -> Run {
    let mut session = session(policy);
    let mut increments = Vec::new();
    for chunk in case.plan.byte_chunks(input) {
        session.push_bytes(chunk);
        increments.push(session.snapshot());
    }
    into_run(session, increments)
}

fn into_run(mut session: ParseSession, increments: Vec<Snapshot>) -> Run {
    let report = session.finish();
    // Text outside the root is reported once per text token, and text token
    // boundaries follow increment boundaries.
    let errors = report
        .errors
        .into_iter()
        .filter(|error| error.code != ParseErrorCode::TextOutsideRoot)
        .collect();
    Run {
        snapshot: report.snapshot,
        errors,
        increments,
    }
}

/// Checks every increment's snapshot for nesting and for a FINISHED status
/// that never flips back. Returns whether any increment was finished.
fn assert_increments_well_formed(input: &str, case: &ChunkPlanCase, run: &Run) -> bool {
    let mut seen_finished = false;
    for (index, snapshot) in run.increments.iter().enumerate() {
        assert!(
            is_well_formed(&snapshot.markup),
            "{input:?} {} increment {index}: {:?}",
            case.label,
            snapshot.markup
        );
        if seen_finished {
            assert_eq!(
                snapshot.status,
                SnapshotStatus::Finished,
                "{input:?} {} increment {index}",
                case.label
            );
        }
        seen_finished |= snapshot.is_finished();
    }
    seen_finished
}

fn seed_count() -> usize {
    if let Ok(value) = std::env::var("TAGSTREAM_PARITY_SEEDS")
        && let Ok(parsed) = value.parse::<usize>()
        && parsed > 0
    {
        return parsed;
    }
    if std::env::var("CI").is_ok() {
        DEFAULT_SEEDS_CI
    } else {
        DEFAULT_SEEDS_LOCAL
    }
}

fn run_budget() -> usize {
    if let Ok(value) = std::env::var("TAGSTREAM_PARITY_BUDGET")
        && let Ok(parsed) = value.parse::<usize>()
        && parsed > 0
    {
        return parsed;
    }
    if std::env::var("CI").is_ok() {
        DEFAULT_BUDGET_CI
    } else {
        DEFAULT_BUDGET_LOCAL
    }
}
