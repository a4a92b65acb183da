use markup::chunker::{BoundaryPolicy, ChunkPlan, build_chunk_plans};
use markup::{MismatchPolicy, ParseSession, SessionConfig, TreeBuilderConfig};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
enum FixtureStatus {
    #[default]
    Active,
    Xfail,
    Skip,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Mismatch {
    Literal,
    #[default]
    Discard,
    Pop,
}

impl From<Mismatch> for MismatchPolicy {
    fn from(value: Mismatch) -> Self {
        match value {
            Mismatch::Literal => MismatchPolicy::LiteralText,
            Mismatch::Discard => MismatchPolicy::Discard,
            Mismatch::Pop => MismatchPolicy::PopToMatch,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    #[serde(default)]
    status: FixtureStatus,
    reason: Option<String>,
    #[serde(default)]
    mismatch: Mismatch,
    increments: Vec<String>,
    snapshots: Vec<String>,
    #[serde(rename = "final")]
    final_snapshot: Option<String>,
    errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(rename = "case")]
    cases: Vec<Fixture>,
}

#[derive(Debug, PartialEq)]
struct Outcome {
    lines: Vec<String>,
    final_line: String,
    errors: Vec<String>,
}

#[test]
fn golden_sessions_whole_increments() {
    let mut ran = 0usize;
    for fixture in selected_fixtures() {
        ran += 1;
        let outcome = run_increments(&fixture, fixture.increments.iter().map(String::as_bytes));
        let mismatch = describe_mismatch(&fixture, &outcome);
        enforce(&fixture, mismatch);
    }
    assert!(ran > 0, "no fixtures matched filter");
}

#[test]
fn golden_sessions_chunked_input() {
    let fuzz_runs = env_u64("TAGSTREAM_PARITY_SEEDS", 4) as usize;
    let mut ran = 0usize;
    for fixture in selected_fixtures() {
        if fixture.status != FixtureStatus::Active {
            continue;
        }
        ran += 1;
        let input: String = fixture.increments.concat();
        let whole = run_increments(&fixture, [input.as_bytes()]);
        for policy in [BoundaryPolicy::Utf8Aligned, BoundaryPolicy::ByteStream] {
            for case in build_chunk_plans(&input, fuzz_runs, 0xC0FFEE, policy) {
                let actual = run_plan(&fixture, &input, &case.plan);
                assert_eq!(
                    actual, whole.final_line,
                    "fixture '{}' diverged under {} ({:?})",
                    fixture.name, case.label, policy
                );
            }
        }
    }
    assert!(ran > 0, "no fixtures matched filter");
}

fn session_for(fixture: &Fixture) -> ParseSession {
    ParseSession::new(SessionConfig {
        builder: TreeBuilderConfig {
            mismatch_policy: fixture.mismatch.into(),
        },
        ..SessionConfig::default()
    })
}

fn run_increments<'a>(fixture: &Fixture, increments: impl IntoIterator<Item = &'a [u8]>) -> Outcome {
    let mut session = session_for(fixture);
    let mut lines = Vec::new();
    for increment in increments {
        session.push_bytes(increment);
        lines.push(session.snapshot().to_string());
    }
    let report = session.finish();
    Outcome {
        lines,
        final_line: report.snapshot.to_string(),
        errors: report
            .errors
            .iter()
            .map(|error| error.code.as_str().to_string())
            .collect(),
    }
}

fn run_plan(fixture: &Fixture, input: &str, plan: &ChunkPlan) -> String {
    run_increments(fixture, plan.byte_chunks(input)).final_line
}

fn describe_mismatch(fixture: &Fixture, outcome: &Outcome) -> Option<String> {
    if outcome.lines != fixture.snapshots {
        return Some(format!(
            "snapshots differ\nexpected: {:#?}\nactual:   {:#?}",
            fixture.snapshots, outcome.lines
        ));
    }
    if let Some(expected) = &fixture.final_snapshot
        && *expected != outcome.final_line
    {
        return Some(format!(
            "final snapshot differs\nexpected: {expected}\nactual:   {}",
            outcome.final_line
        ));
    }
    if let Some(expected) = &fixture.errors
        && *expected != outcome.errors
    {
        return Some(format!(
            "errors differ\nexpected: {expected:?}\nactual:   {:?}",
            outcome.errors
        ));
    }
    None
}

fn enforce(fixture: &Fixture, mismatch: Option<String>) {
    match (fixture.status, mismatch) {
        (FixtureStatus::Active, Some(diff)) => {
            panic!("fixture '{}' failed: {diff}", fixture.name)
        }
        (FixtureStatus::Xfail, None) => panic!(
            "fixture '{}' passed but is marked xfail; reason: {}",
            fixture.name,
            fixture.reason.as_deref().unwrap_or("<missing reason>")
        ),
        _ => {}
    }
}

fn selected_fixtures() -> Vec<Fixture> {
    let filter = env::var("TAGSTREAM_FIXTURE").ok();
    load_fixtures()
        .into_iter()
        .filter(|fixture| fixture.status != FixtureStatus::Skip)
        .filter(|fixture| {
            filter
                .as_deref()
                .is_none_or(|needle| fixture.name.contains(needle))
        })
        .collect()
}

fn load_fixtures() -> Vec<Fixture> {
    let path = fixtures_path();
    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    let file: FixtureFile = toml::from_str(&raw)
        .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()));
    for fixture in &file.cases {
        assert!(
            fixture.increments.len() == fixture.snapshots.len(),
            "fixture '{}' needs one snapshot per increment",
            fixture.name
        );
    }
    file.cases
}

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sessions.toml")
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
