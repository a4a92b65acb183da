//! Session counters.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub increments: u64,
    pub tokens_emitted: u64,
    pub parse_errors: u64,
}
