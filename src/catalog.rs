//! Static step catalogs, one per track.
//!
//! Each step is a plain record: a title, a description and the [`Figure`] to
//! draw. Turning a figure into a picture is the job of a
//! [`DiagramRenderer`](crate::diagram::DiagramRenderer); nothing here knows
//! about dimensions or layout.

use crate::nav::{Mode, Track};

/// Identifies the diagram drawn for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Figure {
    PrefillInput,
    PrefillWeights,
    PrefillQkv,
    PrefillScores,
    PrefillHead,
    PrefillConcat,
    PrefillOutput,

    DecodeInput,
    DecodeQkv,
    DecodeAppendCache,
    DecodeScores,
    DecodeHead,
    DecodeOutput,

    RecomputeInput,
    RecomputeQkv,
    RecomputeScores,
    RecomputeHead,
    RecomputeOutput,
    RecomputeCost,
}

/// One entry of a walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    /// Short heading.
    pub title: &'static str,
    /// One or two sentences of explanation.
    pub description: &'static str,
    /// Diagram for this step.
    pub figure: Figure,
}

/// Prefill: the whole prompt in one pass.
pub static PREFILL_STEPS: [StepDescriptor; 7] = [
    StepDescriptor {
        title: "1. Input embedding",
        description: "The input is the full sequence at once: one row per prompt token, \
                      shape [L, D].",
        figure: Figure::PrefillInput,
    },
    StepDescriptor {
        title: "2. Per-head projection weights",
        description: "Each head owns three weight matrices Wq, Wk and Wv of shape [D, dk]. \
                      The same weights are used for every token.",
        figure: Figure::PrefillWeights,
    },
    StepDescriptor {
        title: "3. Generate Q, K, V",
        description: "Multiplying X by the three weights projects every token at once, \
                      giving Q, K and V of shape [L, dk].",
        figure: Figure::PrefillQkv,
    },
    StepDescriptor {
        title: "4. Attention scores",
        description: "Q times K transposed is an [L, L] square. The causal mask hides every \
                      position after the query. This square is why prefill is compute heavy.",
        figure: Figure::PrefillScores,
    },
    StepDescriptor {
        title: "5. Weighted values",
        description: "Softmax turns each score row into weights over V, producing the head \
                      output of shape [L, dk].",
        figure: Figure::PrefillHead,
    },
    StepDescriptor {
        title: "6. Concatenate heads",
        description: "The outputs of all heads are placed side by side, restoring the model \
                      dimension: [L, D].",
        figure: Figure::PrefillConcat,
    },
    StepDescriptor {
        title: "7. Output projection and cache fill",
        description: "Wo mixes the heads into the final output. K and V of every prompt token \
                      are kept as the KV cache for decoding.",
        figure: Figure::PrefillOutput,
    },
];

/// Decoding with the KV cache: one new token per pass.
pub static DECODING_STEPS: [StepDescriptor; 6] = [
    StepDescriptor {
        title: "1. Single-token input",
        description: "During decoding the input is only the token generated last: \
                      shape [1, D].",
        figure: Figure::DecodeInput,
    },
    StepDescriptor {
        title: "2. Project q, k, v",
        description: "The same weights project the single row into q, k and v of \
                      shape [1, dk].",
        figure: Figure::DecodeQkv,
    },
    StepDescriptor {
        title: "3. Append to the KV cache",
        description: "The new k and v rows are appended to the cached L rows. Nothing old \
                      is recomputed.",
        figure: Figure::DecodeAppendCache,
    },
    StepDescriptor {
        title: "4. Attention over the cache",
        description: "The new query looks at every cached key. The result is a flat vector \
                      [1, L+1] instead of a square.",
        figure: Figure::DecodeScores,
    },
    StepDescriptor {
        title: "5. Weighted values",
        description: "The score vector weights all L+1 cached values, giving a single head \
                      row [1, dk].",
        figure: Figure::DecodeHead,
    },
    StepDescriptor {
        title: "6. Output for the new token",
        description: "Heads are concatenated and projected by Wo: one output row [1, D] \
                      for the next-token prediction.",
        figure: Figure::DecodeOutput,
    },
];

/// Decoding without a cache: the naive full recomputation.
pub static NO_CACHE_STEPS: [StepDescriptor; 6] = [
    StepDescriptor {
        title: "1. Re-feed the whole sequence",
        description: "Without a cache the model has to see the prompt again plus the new \
                      token: shape [L+1, D].",
        figure: Figure::RecomputeInput,
    },
    StepDescriptor {
        title: "2. Recompute Q, K, V",
        description: "All L+1 rows are projected again. Only the last row is new; the other \
                      L rows repeat work done in the previous pass.",
        figure: Figure::RecomputeQkv,
    },
    StepDescriptor {
        title: "3. Recompute the full score matrix",
        description: "Scores grow to [L+1, L+1]. The old L x L block is recomputed even \
                      though it has not changed.",
        figure: Figure::RecomputeScores,
    },
    StepDescriptor {
        title: "4. Head outputs for every row",
        description: "Every row gets a head output again, [L+1, dk], though only the last \
                      one is needed.",
        figure: Figure::RecomputeHead,
    },
    StepDescriptor {
        title: "5. Output, last row used",
        description: "The projection yields [L+1, D]; the prediction reads just the final \
                      row and throws the rest away.",
        figure: Figure::RecomputeOutput,
    },
    StepDescriptor {
        title: "6. Cost comparison",
        description: "Score cells touched per decoding step, with and without the cache. \
                      Without it the work grows quadratically with the sequence.",
        figure: Figure::RecomputeCost,
    },
];

/// Steps of a track.
pub fn steps(track: Track) -> &'static [StepDescriptor] {
    match track {
        Track::Prefill => &PREFILL_STEPS,
        Track::Decoding => &DECODING_STEPS,
        Track::NoCache => &NO_CACHE_STEPS,
    }
}

/// Steps for the given mode; the overview has none.
pub fn active_catalog(mode: Mode) -> Option<&'static [StepDescriptor]> {
    mode.track().map(steps)
}

/// Descriptor at `step` in the active catalog.
pub fn current_descriptor(mode: Mode, step: usize) -> Option<&'static StepDescriptor> {
    active_catalog(mode).and_then(|steps| steps.get(step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lengths() {
        assert_eq!(steps(Track::Prefill).len(), 7);
        assert_eq!(steps(Track::Decoding).len(), 6);
        assert_eq!(steps(Track::NoCache).len(), 6);
    }

    #[test]
    fn test_titles_are_numbered_in_order() {
        for track in Track::ALL {
            for (i, step) in steps(track).iter().enumerate() {
                assert!(
                    step.title.starts_with(&format!("{}.", i + 1)),
                    "{track} step {i} has title {:?}",
                    step.title
                );
            }
        }
    }
}
