//! Chunk plans for streaming tests.
//!
//! A chunk plan cuts one input into increments. Deterministic plans cover
//! fixed sizes and cuts next to every markup delimiter; seeded fuzz plans add
//! random cut sets that are reproducible from their label.

/// Where a plan may cut.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Only at `char` boundaries; every increment is valid UTF-8.
    Utf8Aligned,
    /// Anywhere, including inside a multi-byte character.
    ByteStream,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkPlan {
    /// Increments of `size` bytes (the last may be shorter).
    Fixed { size: usize, policy: BoundaryPolicy },
    /// Cut at each listed byte offset.
    Boundaries {
        indices: Vec<usize>,
        policy: BoundaryPolicy,
    },
}

impl ChunkPlan {
    pub fn fixed(size: usize, policy: BoundaryPolicy) -> Self {
        assert!(size > 0, "chunk size must be > 0");
        ChunkPlan::Fixed { size, policy }
    }

    pub fn boundaries(indices: Vec<usize>, policy: BoundaryPolicy) -> Self {
        ChunkPlan::Boundaries { indices, policy }
    }

    pub fn policy(&self) -> BoundaryPolicy {
        match self {
            ChunkPlan::Fixed { policy, .. } | ChunkPlan::Boundaries { policy, .. } => *policy,
        }
    }

    /// Cut offsets for `input`, strictly increasing and strictly inside it.
    pub fn cut_points(&self, input: &str) -> Vec<usize> {
        let len = input.len();
        let raw: Vec<usize> = match self {
            ChunkPlan::Fixed { size, .. } => (1..).map(|i| i * size).take_while(|&i| i < len).collect(),
            ChunkPlan::Boundaries { indices, .. } => indices.clone(),
        };
        let mut cuts = filter_boundaries(input, &raw, self.policy());
        cuts.retain(|&i| i > 0 && i < len);
        cuts.sort_unstable();
        cuts.dedup();
        cuts
    }

    /// Byte increments for `input`; concatenated they reproduce `input`.
    pub fn byte_chunks<'a>(&self, input: &'a str) -> Vec<&'a [u8]> {
        let bytes = input.as_bytes();
        let mut out = Vec::new();
        let mut last = 0;
        for cut in self.cut_points(input) {
            out.push(&bytes[last..cut]);
            last = cut;
        }
        out.push(&bytes[last..]);
        out
    }

    /// Text increments for `input`.
    ///
    /// Panics for `ByteStream` plans, whose increments need not be valid UTF-8.
    pub fn str_chunks<'a>(&self, input: &'a str) -> Vec<&'a str> {
        assert_eq!(
            self.policy(),
            BoundaryPolicy::Utf8Aligned,
            "str_chunks requires a UTF-8 aligned plan"
        );
        let mut out = Vec::new();
        let mut last = 0;
        for cut in self.cut_points(input) {
            out.push(&input[last..cut]);
            last = cut;
        }
        out.push(&input[last..]);
        out
    }
}

#[derive(Clone, Debug)]
pub struct ChunkPlanCase {
    pub label: String,
    pub plan: ChunkPlan,
}

/// Fixed sizes, delimiter cuts, then `fuzz_runs` seeded random cut sets.
pub fn build_chunk_plans(
    input: &str,
    fuzz_runs: usize,
    fuzz_seed: u64,
    policy: BoundaryPolicy,
) -> Vec<ChunkPlanCase> {
    let mut plans = Vec::new();

    for size in [1usize, 2, 3, 5, 8, 13, 64] {
        plans.push(ChunkPlanCase {
            label: format!("fixed size={size}"),
            plan: ChunkPlan::fixed(size, policy),
        });
    }

    let delimiters = delimiter_boundaries(input, policy);
    if !delimiters.is_empty() {
        plans.push(ChunkPlanCase {
            label: format!("delimiters count={}", delimiters.len()),
            plan: ChunkPlan::boundaries(delimiters.clone(), policy),
        });
    }

    let mut candidates = all_boundaries(input, policy);
    if candidates.is_empty() {
        return plans;
    }
    candidates.extend(delimiters);
    candidates.sort_unstable();
    candidates.dedup();

    for run in 0..fuzz_runs {
        let seed = fuzz_seed.wrapping_add(run as u64);
        let mut rng = Lcg::new(seed);
        let mut picks = candidates.clone();
        rng.shuffle(&mut picks);
        picks.truncate(1 + rng.below(candidates.len().min(32)));
        picks.sort_unstable();
        plans.push(ChunkPlanCase {
            label: format!("fuzz seed=0x{seed:016x}"),
            plan: ChunkPlan::boundaries(picks, policy),
        });
    }
    plans
}

/// Offsets on both sides of `<`, `</`, `<?`, `?>`, `/>`, `>` and ASCII whitespace.
pub fn delimiter_boundaries(input: &str, policy: BoundaryPolicy) -> Vec<usize> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        let delimiter = matches!(b, b'<' | b'>' | b'/' | b'?') || b.is_ascii_whitespace();
        if delimiter {
            out.push(i);
            out.push(i + 1);
        }
    }
    let mut out = filter_boundaries(input, &out, policy);
    out.retain(|&i| i > 0 && i < bytes.len());
    out.sort_unstable();
    out.dedup();
    out
}

fn all_boundaries(input: &str, policy: BoundaryPolicy) -> Vec<usize> {
    match policy {
        BoundaryPolicy::Utf8Aligned => input.char_indices().map(|(i, _)| i).filter(|&i| i > 0).collect(),
        BoundaryPolicy::ByteStream => (1..input.len()).collect(),
    }
}

fn filter_boundaries(input: &str, indices: &[usize], policy: BoundaryPolicy) -> Vec<usize> {
    match policy {
        BoundaryPolicy::Utf8Aligned => indices
            .iter()
            .copied()
            .filter(|&i| i <= input.len() && input.is_char_boundary(i))
            .collect(),
        BoundaryPolicy::ByteStream => indices.iter().copied().filter(|&i| i <= input.len()).collect(),
    }
}

/// Seeded LCG so fuzz plans reproduce from the seed in their label.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn below(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        ((self.next_u64() >> 33) as usize) % upper
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
