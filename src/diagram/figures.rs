//! Default renderer: draws each figure from the configured dimensions.

use crate::catalog::Figure;
use crate::config::{Dimensions, TokenConfig, TourConfig};
use crate::nav::Phase;

use super::{Block, BlockGrid, Diagram, DiagramRenderer, Emphasis, Ink, Line, Span, Tone};

/// Width of the bars in the cost comparison.
const COST_BAR_WIDTH: usize = 40;

/// Number of future decoding steps listed in the cost comparison.
const COST_ROWS: usize = 4;

/// Draws figures as block grids sized by [`Dimensions`].
#[derive(Debug, Clone)]
pub struct FigureRenderer {
    dims: Dimensions,
    tokens: TokenConfig,
}

impl FigureRenderer {
    pub fn new(dims: Dimensions, tokens: TokenConfig) -> Self {
        Self { dims, tokens }
    }

    pub fn from_config(config: &TourConfig) -> Self {
        Self::new(config.dimensions, config.tokens.clone())
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    fn legend(&self, caption: &str) -> String {
        let d = &self.dims;
        format!(
            "{caption}   (L={}, D={}, heads={}, dk={})",
            d.seq_len, d.model_dim, d.num_heads, d.head_dim
        )
    }

    fn all_tokens(&self) -> Vec<&str> {
        self.tokens
            .prompt
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.tokens.next.as_str()))
            .collect()
    }

    // Inputs

    fn prompt_input(&self) -> Block {
        BlockGrid::new(self.dims.seq_len, self.dims.model_dim, Tone::Neutral, "X")
            .shape("[L, D]")
            .row_labels(&self.tokens.prompt)
            .to_block()
    }

    fn new_token_input(&self) -> Block {
        BlockGrid::new(1, self.dims.model_dim, Tone::Neutral, "x_new")
            .shape("[1, D]")
            .row_labels([&self.tokens.next])
            .to_block()
    }

    fn full_input(&self) -> Block {
        BlockGrid::new(self.dims.extended_len(), self.dims.model_dim, Tone::Neutral, "X_full")
            .shape("[L+1, D]")
            .emphasis(Emphasis::LastRow)
            .row_labels(self.all_tokens())
            .to_block()
    }

    // Weights

    fn projection_weights(&self) -> Block {
        let (d, dk) = (self.dims.model_dim, self.dims.head_dim);
        Block::row(
            vec![
                BlockGrid::new(d, dk, Tone::Query, "Wqⁱ").shape("[D, dk]").to_block(),
                BlockGrid::new(d, dk, Tone::Key, "Wkⁱ").shape("[D, dk]").to_block(),
                BlockGrid::new(d, dk, Tone::Value, "Wvⁱ").shape("[D, dk]").to_block(),
            ],
            1,
        )
    }

    fn output_weights(&self) -> Block {
        let d = self.dims.model_dim;
        BlockGrid::new(d, d, Tone::Neutral, "Wo").shape("[D, D]").to_block()
    }

    // Per-head tensors, `rows` tall

    fn qkv(&self, rows: usize, lower: bool, shape: &str, emphasis: Emphasis) -> Block {
        let dk = self.dims.head_dim;
        let names = if lower {
            ["qⁱ", "kⁱ", "vⁱ"]
        } else {
            ["Qⁱ", "Kⁱ", "Vⁱ"]
        };
        let tones = [Tone::Query, Tone::Key, Tone::Value];
        Block::row(
            names
                .into_iter()
                .zip(tones)
                .map(|(name, tone)| {
                    BlockGrid::new(rows, dk, tone, name)
                        .shape(shape)
                        .emphasis(emphasis)
                        .to_block()
                })
                .collect(),
            1,
        )
    }

    fn kv_cache(&self, emphasis: Emphasis) -> Block {
        let (l, dk) = (self.dims.seq_len, self.dims.head_dim);
        Block::row(
            vec![
                BlockGrid::new(l, dk, Tone::Key, "Kⁱ_cache")
                    .shape("[L, dk]")
                    .emphasis(emphasis)
                    .to_block(),
                BlockGrid::new(l, dk, Tone::Value, "Vⁱ_cache")
                    .shape("[L, dk]")
                    .emphasis(emphasis)
                    .to_block(),
            ],
            1,
        )
    }

    fn heads(&self, rows: usize, emphasis: Emphasis) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(self.dims.num_heads * 2);
        for h in 1..=self.dims.num_heads {
            if h > 1 {
                blocks.push(Block::symbol("‖"));
            }
            blocks.push(
                BlockGrid::new(rows, self.dims.head_dim, Tone::Output, format!("H{h}"))
                    .shape("")
                    .emphasis(emphasis)
                    .to_block(),
            );
        }
        blocks
    }

    fn note(text: &str) -> Line {
        Line::new(vec![Span::new(text, Tone::Neutral, Ink::Faint)])
    }

    // Prefill track

    fn prefill(&self, figure: Figure) -> Diagram {
        let d = self.dims;
        let (l, dk, dm) = (d.seq_len, d.head_dim, d.model_dim);
        match figure {
            Figure::PrefillInput => {
                let mut diagram = Diagram::new(self.legend("Input X: every prompt token at once"));
                diagram.push_row(vec![self.prompt_input()]);
                diagram
            }
            Figure::PrefillWeights => {
                let mut diagram = Diagram::new(self.legend("Weights of head i"));
                diagram.push_row(vec![
                    self.prompt_input(),
                    Block::symbol("×"),
                    self.projection_weights(),
                ]);
                diagram
            }
            Figure::PrefillQkv => {
                let mut diagram = Diagram::new(self.legend("X · W = Q, K, V"));
                diagram.push_row(vec![
                    self.prompt_input(),
                    Block::symbol("×"),
                    self.projection_weights(),
                    Block::symbol("="),
                    self.qkv(l, false, "[L, dk]", Emphasis::Solid),
                ]);
                diagram
            }
            Figure::PrefillScores => {
                let mut diagram = Diagram::new(self.legend("Scoresⁱ = Qⁱ · Kⁱᵀ with causal mask"));
                diagram.push_row(vec![
                    BlockGrid::new(l, dk, Tone::Query, "Qⁱ").shape("[L, dk]").to_block(),
                    Block::symbol("×"),
                    BlockGrid::new(dk, l, Tone::Key, "Kⁱᵀ").shape("[dk, L]").to_block(),
                    Block::symbol("="),
                    BlockGrid::new(l, l, Tone::Score, "Scoresⁱ")
                        .shape("[L, L]")
                        .emphasis(Emphasis::Causal)
                        .to_block(),
                ]);
                diagram.push_line(Self::note("· = masked: a token never attends to later tokens"));
                diagram
            }
            Figure::PrefillHead => {
                let mut diagram = Diagram::new(self.legend("Headⁱ = softmax(Scoresⁱ) · Vⁱ"));
                diagram.push_row(vec![
                    BlockGrid::new(l, l, Tone::Score, "softmax")
                        .shape("[L, L]")
                        .emphasis(Emphasis::Causal)
                        .to_block(),
                    Block::symbol("×"),
                    BlockGrid::new(l, dk, Tone::Value, "Vⁱ").shape("[L, dk]").to_block(),
                    Block::symbol("="),
                    BlockGrid::new(l, dk, Tone::Output, "Headⁱ").shape("[L, dk]").to_block(),
                ]);
                diagram
            }
            Figure::PrefillConcat => {
                let mut diagram = Diagram::new(self.legend("Concat(H1..Hh)"));
                let mut blocks = self.heads(l, Emphasis::Solid);
                blocks.push(Block::symbol("="));
                blocks.push(
                    BlockGrid::new(l, dm, Tone::Output, "Concat")
                        .shape("[L, D]")
                        .to_block(),
                );
                diagram.push_row(blocks);
                diagram
            }
            Figure::PrefillOutput => {
                let mut diagram = Diagram::new(self.legend("Output = Concat · Wo, K/V kept"));
                diagram.push_row(vec![
                    BlockGrid::new(l, dm, Tone::Output, "Concat").shape("[L, D]").to_block(),
                    Block::symbol("×"),
                    self.output_weights(),
                    Block::symbol("="),
                    BlockGrid::new(l, dm, Tone::Output, "Output")
                        .shape("[L, D]")
                        .emphasis(Emphasis::LastRow)
                        .to_block(),
                ]);
                diagram.push_blank();
                diagram.push_row(vec![
                    Block::text("saved to cache", Tone::Neutral, Ink::Faint),
                    Block::symbol("→"),
                    self.kv_cache(Emphasis::Solid),
                ]);
                diagram
            }
            _ => Diagram::default(),
        }
    }

    // Decoding with cache

    fn decoding(&self, figure: Figure) -> Diagram {
        let d = self.dims;
        let (l, dk, dm, l1) = (d.seq_len, d.head_dim, d.model_dim, d.extended_len());
        match figure {
            Figure::DecodeInput => {
                let mut diagram = Diagram::new(self.legend("Input: only the newest token"));
                diagram.push_row(vec![
                    self.new_token_input(),
                    Block::symbol(" "),
                    self.kv_cache(Emphasis::Dim),
                ]);
                diagram.push_line(Self::note("░ = cached from earlier passes, not recomputed"));
                diagram
            }
            Figure::DecodeQkv => {
                let mut diagram = Diagram::new(self.legend("x_new · W = q, k, v"));
                diagram.push_row(vec![
                    self.new_token_input(),
                    Block::symbol("×"),
                    self.projection_weights(),
                    Block::symbol("="),
                    self.qkv(1, true, "[1, dk]", Emphasis::Solid),
                ]);
                diagram
            }
            Figure::DecodeAppendCache => {
                let mut diagram = Diagram::new(self.legend("Append k, v to the cache"));
                for (tone, cache, new, full) in [
                    (Tone::Key, "Kⁱ_cache", "kⁱ", "Kⁱ"),
                    (Tone::Value, "Vⁱ_cache", "vⁱ", "Vⁱ"),
                ] {
                    diagram.push_row(vec![
                        BlockGrid::new(l, dk, tone, cache)
                            .shape("[L, dk]")
                            .emphasis(Emphasis::Dim)
                            .to_block(),
                        Block::symbol("⊕"),
                        BlockGrid::new(1, dk, tone, new).shape("[1, dk]").to_block(),
                        Block::symbol("="),
                        BlockGrid::new(l1, dk, tone, full)
                            .shape("[L+1, dk]")
                            .emphasis(Emphasis::GrowRow { old: l })
                            .to_block(),
                    ]);
                }
                diagram
            }
            Figure::DecodeScores => {
                let mut diagram = Diagram::new(self.legend("Scoresⁱ = qⁱ · Kⁱᵀ"));
                diagram.push_row(vec![
                    BlockGrid::new(1, dk, Tone::Query, "qⁱ").shape("[1, dk]").to_block(),
                    Block::symbol("×"),
                    BlockGrid::new(dk, l1, Tone::Key, "Kⁱᵀ")
                        .shape("[dk, L+1]")
                        .emphasis(Emphasis::GrowCol { old: l })
                        .to_block(),
                    Block::symbol("="),
                    BlockGrid::new(1, l1, Tone::Score, "Scoresⁱ")
                        .shape("[1, L+1]")
                        .to_block(),
                ]);
                diagram.push_line(Self::note("one row of scores instead of an [L+1, L+1] square"));
                diagram
            }
            Figure::DecodeHead => {
                let mut diagram = Diagram::new(self.legend("Headⁱ = softmax(Scoresⁱ) · Vⁱ"));
                diagram.push_row(vec![
                    BlockGrid::new(1, l1, Tone::Score, "softmax")
                        .shape("[1, L+1]")
                        .to_block(),
                    Block::symbol("×"),
                    BlockGrid::new(l1, dk, Tone::Value, "Vⁱ")
                        .shape("[L+1, dk]")
                        .emphasis(Emphasis::GrowRow { old: l })
                        .to_block(),
                    Block::symbol("="),
                    BlockGrid::new(1, dk, Tone::Output, "Headⁱ").shape("[1, dk]").to_block(),
                ]);
                diagram
            }
            Figure::DecodeOutput => {
                let mut diagram = Diagram::new(self.legend("Output = Concat · Wo for one token"));
                let mut blocks = self.heads(1, Emphasis::Solid);
                blocks.push(Block::symbol("×"));
                blocks.push(self.output_weights());
                blocks.push(Block::symbol("="));
                blocks.push(
                    BlockGrid::new(1, dm, Tone::Output, "Output")
                        .shape("[1, D]")
                        .to_block(),
                );
                diagram.push_row(blocks);
                diagram
            }
            _ => Diagram::default(),
        }
    }

    // Decoding without cache

    fn recompute(&self, figure: Figure) -> Diagram {
        let d = self.dims;
        let (l, dk, dm, l1) = (d.seq_len, d.head_dim, d.model_dim, d.extended_len());
        match figure {
            Figure::RecomputeInput => {
                let mut diagram = Diagram::new(self.legend("Input: the whole sequence again"));
                diagram.push_row(vec![self.full_input()]);
                diagram.push_line(Self::note("▒ = seen before, processed again"));
                diagram
            }
            Figure::RecomputeQkv => {
                let mut diagram = Diagram::new(self.legend("X_full · W = Q, K, V (all rows)"));
                diagram.push_row(vec![
                    self.full_input(),
                    Block::symbol("×"),
                    self.projection_weights(),
                    Block::symbol("="),
                    self.qkv(l1, false, "[L+1, dk]", Emphasis::LastRow),
                ]);
                diagram
            }
            Figure::RecomputeScores => {
                let mut diagram = Diagram::new(self.legend("Scoresⁱ = Qⁱ · Kⁱᵀ, full square"));
                diagram.push_row(vec![
                    BlockGrid::new(l1, dk, Tone::Query, "Qⁱ")
                        .shape("[L+1, dk]")
                        .emphasis(Emphasis::LastRow)
                        .to_block(),
                    Block::symbol("×"),
                    BlockGrid::new(dk, l1, Tone::Key, "Kⁱᵀ")
                        .shape("[dk, L+1]")
                        .emphasis(Emphasis::LastCol)
                        .to_block(),
                    Block::symbol("="),
                    BlockGrid::new(l1, l1, Tone::Score, "Scoresⁱ")
                        .shape("[L+1, L+1]")
                        .emphasis(Emphasis::NewCross { old: l })
                        .to_block(),
                ]);
                diagram.push_line(Self::note(&format!(
                    "▒ = the old {l}x{l} block, identical to the previous pass"
                )));
                diagram
            }
            Figure::RecomputeHead => {
                let mut diagram = Diagram::new(self.legend("Headⁱ for every row"));
                diagram.push_row(vec![
                    BlockGrid::new(l1, l1, Tone::Score, "softmax")
                        .shape("[L+1, L+1]")
                        .emphasis(Emphasis::NewCross { old: l })
                        .to_block(),
                    Block::symbol("×"),
                    BlockGrid::new(l1, dk, Tone::Value, "Vⁱ")
                        .shape("[L+1, dk]")
                        .emphasis(Emphasis::LastRow)
                        .to_block(),
                    Block::symbol("="),
                    BlockGrid::new(l1, dk, Tone::Output, "Headⁱ")
                        .shape("[L+1, dk]")
                        .emphasis(Emphasis::LastRow)
                        .to_block(),
                ]);
                diagram
            }
            Figure::RecomputeOutput => {
                let mut diagram = Diagram::new(self.legend("Output: only the last row matters"));
                let mut blocks = self.heads(l1, Emphasis::LastRow);
                blocks.push(Block::symbol("×"));
                blocks.push(self.output_weights());
                blocks.push(Block::symbol("="));
                blocks.push(
                    BlockGrid::new(l1, dm, Tone::Output, "Output")
                        .shape("[L+1, D]")
                        .emphasis(Emphasis::LastRow)
                        .to_block(),
                );
                diagram.push_row(blocks);
                diagram.push_line(Self::note(&format!(
                    "{l} of {l1} output rows are discarded"
                )));
                diagram
            }
            Figure::RecomputeCost => self.cost_comparison(),
            _ => Diagram::default(),
        }
    }

    fn cost_comparison(&self) -> Diagram {
        let mut diagram = Diagram::new(self.legend("Score cells per decoding step"));
        let first = self.dims.extended_len();
        let last = first + COST_ROWS - 1;
        let max = last * last;

        let (mut cached_total, mut naive_total) = (0, 0);
        for n in first..=last {
            let (cached, naive) = score_cells(n);
            cached_total += cached;
            naive_total += naive;
            diagram.push_line(Self::note(&format!("context = {n}")));
            diagram.push_line(cost_line("with cache   ", cached, max, Tone::Score));
            diagram.push_line(cost_line("without cache", naive, max, Tone::Query));
        }

        diagram.push_blank();
        diagram.push_line(Line::plain(format!(
            "over {COST_ROWS} steps: {cached_total} cells with cache vs {naive_total} without \
             ({:.1}x)",
            naive_total as f32 / cached_total as f32
        )));
        diagram
    }

    // Overview

    fn overview_prefill(&self) -> Diagram {
        let d = self.dims;
        let (l, dk, dm) = (d.seq_len, d.head_dim, d.model_dim);
        let mut diagram = Diagram::new(self.legend(Phase::One.title()));
        diagram.push_row(vec![
            self.prompt_input(),
            Block::symbol("×"),
            self.projection_weights(),
            Block::symbol("="),
            self.qkv(l, false, "[L, dk]", Emphasis::Solid),
        ]);
        diagram.push_blank();
        diagram.push_row(vec![
            BlockGrid::new(l, dk, Tone::Query, "Qⁱ").shape("[L, dk]").to_block(),
            Block::symbol("×"),
            BlockGrid::new(dk, l, Tone::Key, "Kⁱᵀ").shape("[dk, L]").to_block(),
            Block::symbol("="),
            BlockGrid::new(l, l, Tone::Score, "Scoresⁱ")
                .shape("[L, L]")
                .emphasis(Emphasis::Causal)
                .to_block(),
            Block::symbol("×"),
            BlockGrid::new(l, dk, Tone::Value, "Vⁱ").shape("[L, dk]").to_block(),
            Block::symbol("="),
            BlockGrid::new(l, dk, Tone::Output, "Headⁱ").shape("[L, dk]").to_block(),
        ]);
        diagram.push_blank();
        let mut blocks = self.heads(l, Emphasis::Solid);
        blocks.push(Block::symbol("×"));
        blocks.push(self.output_weights());
        blocks.push(Block::symbol("="));
        blocks.push(
            BlockGrid::new(l, dm, Tone::Output, "Output")
                .shape("[L, D]")
                .emphasis(Emphasis::LastRow)
                .to_block(),
        );
        diagram.push_row(blocks);
        diagram
    }

    fn overview_decoding(&self) -> Diagram {
        let d = self.dims;
        let (l, dk, dm, l1) = (d.seq_len, d.head_dim, d.model_dim, d.extended_len());
        let mut diagram = Diagram::new(self.legend(Phase::Two.title()));
        diagram.push_row(vec![
            self.new_token_input(),
            Block::symbol("×"),
            self.projection_weights(),
            Block::symbol("="),
            self.qkv(1, true, "[1, dk]", Emphasis::Solid),
            Block::symbol("⊕"),
            self.kv_cache(Emphasis::Dim),
        ]);
        diagram.push_blank();
        diagram.push_row(vec![
            BlockGrid::new(1, dk, Tone::Query, "qⁱ").shape("[1, dk]").to_block(),
            Block::symbol("×"),
            BlockGrid::new(dk, l1, Tone::Key, "Kⁱᵀ")
                .shape("[dk, L+1]")
                .emphasis(Emphasis::GrowCol { old: l })
                .to_block(),
            Block::symbol("="),
            BlockGrid::new(1, l1, Tone::Score, "Scoresⁱ")
                .shape("[1, L+1]")
                .to_block(),
            Block::symbol("×"),
            BlockGrid::new(l1, dk, Tone::Value, "Vⁱ")
                .shape("[L+1, dk]")
                .emphasis(Emphasis::GrowRow { old: l })
                .to_block(),
            Block::symbol("="),
            BlockGrid::new(1, dk, Tone::Output, "Headⁱ").shape("[1, dk]").to_block(),
        ]);
        diagram.push_blank();
        let mut blocks = self.heads(1, Emphasis::Solid);
        blocks.push(Block::symbol("×"));
        blocks.push(self.output_weights());
        blocks.push(Block::symbol("="));
        blocks.push(
            BlockGrid::new(1, dm, Tone::Output, "Output")
                .shape("[1, D]")
                .to_block(),
        );
        diagram.push_row(blocks);
        diagram
    }

    fn overview_no_cache(&self) -> Diagram {
        let d = self.dims;
        let (l, dk, dm, l1) = (d.seq_len, d.head_dim, d.model_dim, d.extended_len());
        let mut diagram = Diagram::new(self.legend(Phase::Three.title()));
        diagram.push_row(vec![
            self.full_input(),
            Block::symbol("×"),
            self.projection_weights(),
            Block::symbol("="),
            self.qkv(l1, false, "[L+1, dk]", Emphasis::LastRow),
        ]);
        diagram.push_blank();
        diagram.push_row(vec![
            BlockGrid::new(l1, dk, Tone::Query, "Qⁱ")
                .shape("[L+1, dk]")
                .emphasis(Emphasis::LastRow)
                .to_block(),
            Block::symbol("×"),
            BlockGrid::new(dk, l1, Tone::Key, "Kⁱᵀ")
                .shape("[dk, L+1]")
                .emphasis(Emphasis::LastCol)
                .to_block(),
            Block::symbol("="),
            BlockGrid::new(l1, l1, Tone::Score, "Scoresⁱ")
                .shape("[L+1, L+1]")
                .emphasis(Emphasis::NewCross { old: l })
                .to_block(),
            Block::symbol("×"),
            BlockGrid::new(l1, dk, Tone::Value, "Vⁱ")
                .shape("[L+1, dk]")
                .emphasis(Emphasis::LastRow)
                .to_block(),
            Block::symbol("="),
            BlockGrid::new(l1, dk, Tone::Output, "Headⁱ")
                .shape("[L+1, dk]")
                .emphasis(Emphasis::LastRow)
                .to_block(),
        ]);
        diagram.push_blank();
        let mut blocks = self.heads(l1, Emphasis::LastRow);
        blocks.push(Block::symbol("×"));
        blocks.push(self.output_weights());
        blocks.push(Block::symbol("="));
        blocks.push(
            BlockGrid::new(l1, dm, Tone::Output, "Output")
                .shape("[L+1, D]")
                .emphasis(Emphasis::LastRow)
                .to_block(),
        );
        diagram.push_row(blocks);
        diagram
    }
}

impl Default for FigureRenderer {
    fn default() -> Self {
        Self::from_config(&TourConfig::default())
    }
}

impl DiagramRenderer for FigureRenderer {
    fn render(&self, figure: Figure) -> Diagram {
        use Figure::*;
        match figure {
            PrefillInput | PrefillWeights | PrefillQkv | PrefillScores | PrefillHead
            | PrefillConcat | PrefillOutput => self.prefill(figure),
            DecodeInput | DecodeQkv | DecodeAppendCache | DecodeScores | DecodeHead
            | DecodeOutput => self.decoding(figure),
            RecomputeInput | RecomputeQkv | RecomputeScores | RecomputeHead | RecomputeOutput
            | RecomputeCost => self.recompute(figure),
        }
    }

    fn overview(&self, phase: Phase) -> Diagram {
        match phase {
            Phase::One => self.overview_prefill(),
            Phase::Two => self.overview_decoding(),
            Phase::Three => self.overview_no_cache(),
        }
    }
}

/// Score cells touched for a context of `n` tokens: (with cache, without).
pub fn score_cells(n: usize) -> (usize, usize) {
    (n, n * n)
}

/// Horizontal bar scaled against `max`, in the style of a memory bar.
fn cost_line(label: &str, value: usize, max: usize, tone: Tone) -> Line {
    let filled = if max == 0 {
        0
    } else {
        (value * COST_BAR_WIDTH).div_ceil(max)
    };
    let empty = COST_BAR_WIDTH - filled.min(COST_BAR_WIDTH);
    Line::new(vec![
        Span::plain(format!("  {label} ")),
        Span::new("█".repeat(filled.min(COST_BAR_WIDTH)), tone, Ink::Strong),
        Span::new("░".repeat(empty), Tone::Neutral, Ink::Faint),
        Span::plain(format!(" {value}")),
    ])
}
