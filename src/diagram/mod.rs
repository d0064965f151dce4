//! Text diagrams of attention shapes.
//!
//! A [`Diagram`] is a list of styled [`Line`]s. Lines are built by laying
//! [`Block`]s side by side: block grids for matrices, short symbols for the
//! operators between them. Every span keeps a [`Tone`] and an [`Ink`] so the
//! terminal front-end can colour it, while [`Diagram::to_plain`] gives the
//! same picture as bare text.

pub mod figures;
pub mod grid;

use unicode_width::UnicodeWidthStr;

use crate::catalog::Figure;
use crate::nav::Phase;

pub use figures::FigureRenderer;
pub use grid::{BlockGrid, Cell, Emphasis};

/// Colour family of a span, one per kind of tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    /// Inputs, weights, operators and prose.
    #[default]
    Neutral,
    /// Queries (red).
    Query,
    /// Keys (blue).
    Key,
    /// Values (green).
    Value,
    /// Attention scores (amber).
    Score,
    /// Head and layer outputs (violet).
    Output,
}

/// How strongly a span is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ink {
    /// Bold / bright.
    Strong,
    /// Regular.
    #[default]
    Soft,
    /// Dimmed.
    Faint,
}

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
    pub ink: Ink,
}

impl Span {
    pub fn new(text: impl Into<String>, tone: Tone, ink: Ink) -> Self {
        Self {
            text: text.into(),
            tone,
            ink,
        }
    }

    /// Unstyled text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Neutral, Ink::Soft)
    }
}

/// One row of styled text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Span::plain(text)])
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.width()).sum()
    }

    /// Append a span, merging with the previous one when the style matches.
    pub fn push(&mut self, span: Span) {
        if span.text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut()
            && last.tone == span.tone
            && last.ink == span.ink
        {
            last.text.push_str(&span.text);
            return;
        }
        self.spans.push(span);
    }

    /// Pad with spaces up to `width` columns.
    pub fn pad_to(&mut self, width: usize) {
        let current = self.width();
        if current < width {
            self.push(Span::plain(" ".repeat(width - current)));
        }
    }

    /// Concatenated text without styling.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A rectangle of lines that can be placed next to other blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    width: usize,
    lines: Vec<Line>,
}

impl Block {
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let width = lines.iter().map(Line::width).max().unwrap_or(0);
        Self { width, lines }
    }

    /// Single line of text.
    pub fn text(text: impl Into<String>, tone: Tone, ink: Ink) -> Self {
        Self::from_lines(vec![Line::new(vec![Span::new(text, tone, ink)])])
    }

    /// Operator symbol with a space on each side.
    pub fn symbol(symbol: &str) -> Self {
        Self::text(format!(" {symbol} "), Tone::Neutral, Ink::Strong)
    }

    /// Stack blocks vertically, left aligned.
    pub fn column(blocks: Vec<Block>) -> Self {
        Self::from_lines(blocks.into_iter().flat_map(|b| b.lines).collect())
    }

    /// Place blocks side by side, vertically centred.
    pub fn row(blocks: Vec<Block>, gap: usize) -> Self {
        Self::from_lines(hstack(&blocks, gap))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}

/// Lay blocks out left to right, centring shorter ones vertically.
pub fn hstack(blocks: &[Block], gap: usize) -> Vec<Line> {
    let height = blocks.iter().map(Block::height).max().unwrap_or(0);
    let mut rows = vec![Line::default(); height];

    for (i, block) in blocks.iter().enumerate() {
        let top = (height - block.height()) / 2;
        for (y, row) in rows.iter_mut().enumerate() {
            if i > 0 {
                row.push(Span::plain(" ".repeat(gap)));
            }
            let mut cell = y
                .checked_sub(top)
                .and_then(|offset| block.lines.get(offset))
                .cloned()
                .unwrap_or_default();
            cell.pad_to(block.width);
            for span in cell.spans {
                row.push(span);
            }
        }
    }
    rows
}

/// A finished picture with a one-line caption.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagram {
    pub title: String,
    pub rows: Vec<Line>,
}

impl Diagram {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Append blocks laid out side by side.
    pub fn push_row(&mut self, blocks: Vec<Block>) -> &mut Self {
        self.rows.extend(hstack(&blocks, 1));
        self
    }

    pub fn push_line(&mut self, line: Line) -> &mut Self {
        self.rows.push(line);
        self
    }

    pub fn push_blank(&mut self) -> &mut Self {
        self.rows.push(Line::default());
        self
    }

    /// Widest row in columns.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Line::width)
            .chain(std::iter::once(self.title.width()))
            .max()
            .unwrap_or(0)
    }

    /// Title and rows as plain text, trailing spaces trimmed.
    pub fn to_plain(&self) -> String {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.title.clone());
        out.extend(self.rows.iter().map(|l| l.text().trim_end().to_string()));
        out.join("\n")
    }
}

/// Turns step figures and overview phases into diagrams.
pub trait DiagramRenderer {
    /// Diagram for one catalog step.
    fn render(&self, figure: Figure) -> Diagram;

    /// Diagram for an overview phase.
    fn overview(&self, phase: Phase) -> Diagram;
}
