//! Block grids: a matrix drawn as one character per element.

use unicode_width::UnicodeWidthStr;

use super::{Block, Ink, Line, Span, Tone};

/// Longest row label kept before truncation.
const MAX_ROW_LABEL: usize = 7;

/// State of a single matrix element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Live or newly computed.
    Hot,
    /// Computed again although nothing changed.
    Warm,
    /// Reused from the cache, or not involved in this step.
    Cold,
    /// Hidden by the causal mask.
    Masked,
}

impl Cell {
    pub fn glyph(&self) -> char {
        match self {
            Cell::Hot => '█',
            Cell::Warm => '▒',
            Cell::Cold => '░',
            Cell::Masked => '·',
        }
    }

    fn ink(&self) -> Ink {
        match self {
            Cell::Hot => Ink::Strong,
            Cell::Warm => Ink::Soft,
            Cell::Cold | Cell::Masked => Ink::Faint,
        }
    }
}

/// Which elements of a grid stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Emphasis {
    /// Every element is live.
    #[default]
    Solid,
    /// Every element is cached or idle.
    Dim,
    /// Only the last row is new; the rest was recomputed.
    LastRow,
    /// Only the last column is new; the rest was recomputed.
    LastCol,
    /// `old` cached rows with new rows appended below.
    GrowRow { old: usize },
    /// `old` cached columns with new columns appended on the right.
    GrowCol { old: usize },
    /// Square whose first `old` rows and columns were recomputed.
    NewCross { old: usize },
    /// Lower triangle live, upper triangle masked.
    Causal,
}

/// A labelled matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGrid {
    rows: usize,
    cols: usize,
    tone: Tone,
    label: String,
    shape: String,
    emphasis: Emphasis,
    row_labels: Vec<String>,
}

impl BlockGrid {
    /// A `rows` x `cols` grid, captioned with its numeric shape.
    pub fn new(rows: usize, cols: usize, tone: Tone, label: impl Into<String>) -> Self {
        Self {
            rows,
            cols,
            tone,
            label: label.into(),
            shape: format!("[{rows}, {cols}]"),
            emphasis: Emphasis::Solid,
            row_labels: Vec::new(),
        }
    }

    /// Replace the shape caption (e.g. `[L, dk]`).
    pub fn shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn emphasis(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// Label each row (token names for input matrices).
    pub fn row_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.row_labels = labels
            .into_iter()
            .map(|l| l.as_ref().chars().take(MAX_ROW_LABEL).collect())
            .collect();
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// State of element (`r`, `c`).
    pub fn cell(&self, r: usize, c: usize) -> Cell {
        let (last_r, last_c) = (self.rows.saturating_sub(1), self.cols.saturating_sub(1));
        match self.emphasis {
            Emphasis::Solid => Cell::Hot,
            Emphasis::Dim => Cell::Cold,
            Emphasis::LastRow if r == last_r => Cell::Hot,
            Emphasis::LastCol if c == last_c => Cell::Hot,
            Emphasis::LastRow | Emphasis::LastCol => Cell::Warm,
            Emphasis::GrowRow { old } if r >= old => Cell::Hot,
            Emphasis::GrowCol { old } if c >= old => Cell::Hot,
            Emphasis::GrowRow { .. } | Emphasis::GrowCol { .. } => Cell::Cold,
            Emphasis::NewCross { old } if r >= old || c >= old => Cell::Hot,
            Emphasis::NewCross { .. } => Cell::Warm,
            Emphasis::Causal if c <= r => Cell::Hot,
            Emphasis::Causal => Cell::Masked,
        }
    }

    /// Count elements in the given state.
    pub fn count(&self, kind: Cell) -> usize {
        (0..self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| (r, c)))
            .filter(|&(r, c)| self.cell(r, c) == kind)
            .count()
    }

    /// Draw the grid: label line, one line per row, shape line.
    pub fn to_block(&self) -> Block {
        let gutter = self
            .row_labels
            .iter()
            .map(|l| l.width())
            .max()
            .map_or(0, |w| w + 1);
        let width = (gutter + self.cols)
            .max(self.label.width())
            .max(self.shape.width());
        let body_pad = (width - gutter - self.cols) / 2;

        let mut lines = Vec::with_capacity(self.rows + 2);
        lines.push(centred(&self.label, width, self.tone, Ink::Strong));

        for r in 0..self.rows {
            let mut line = Line::default();
            line.push(Span::plain(" ".repeat(body_pad)));
            if gutter > 0 {
                let label = self.row_labels.get(r).map(String::as_str).unwrap_or("");
                let pad = gutter - 1 - label.width();
                line.push(Span::new(
                    format!("{}{label} ", " ".repeat(pad)),
                    Tone::Neutral,
                    Ink::Faint,
                ));
            }
            for c in 0..self.cols {
                let cell = self.cell(r, c);
                let tone = if cell == Cell::Masked {
                    Tone::Neutral
                } else {
                    self.tone
                };
                line.push(Span::new(cell.glyph().to_string(), tone, cell.ink()));
            }
            lines.push(line);
        }

        lines.push(centred(&self.shape, width, Tone::Neutral, Ink::Faint));
        Block::from_lines(lines)
    }
}

fn centred(text: &str, width: usize, tone: Tone, ink: Ink) -> Line {
    let left = width.saturating_sub(text.width()) / 2;
    let mut line = Line::default();
    line.push(Span::plain(" ".repeat(left)));
    line.push(Span::new(text, tone, ink));
    line.pad_to(width);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(grid: &BlockGrid) -> Vec<String> {
        let block = grid.to_block();
        let lines = block.lines();
        lines[1..lines.len() - 1]
            .iter()
            .map(|l| l.text().trim().to_string())
            .collect()
    }

    #[test]
    fn test_causal_mask_hides_upper_triangle() {
        let grid = BlockGrid::new(3, 3, Tone::Score, "S").emphasis(Emphasis::Causal);
        assert_eq!(body(&grid), vec!["█··", "██·", "███"]);
        assert_eq!(grid.count(Cell::Masked), 3);
    }

    #[test]
    fn test_grow_row_marks_appended_rows() {
        let grid = BlockGrid::new(3, 2, Tone::Key, "K").emphasis(Emphasis::GrowRow { old: 2 });
        assert_eq!(body(&grid), vec!["░░", "░░", "██"]);
    }

    #[test]
    fn test_new_cross_counts() {
        let grid = BlockGrid::new(4, 4, Tone::Score, "S").emphasis(Emphasis::NewCross { old: 3 });
        assert_eq!(grid.count(Cell::Hot), 7);
        assert_eq!(grid.count(Cell::Warm), 9);
    }

    #[test]
    fn test_block_has_caption_and_shape() {
        let block = BlockGrid::new(2, 3, Tone::Query, "Qⁱ").shape("[L, dk]").to_block();
        assert_eq!(block.height(), 4);
        assert_eq!(block.width(), 7);
        assert_eq!(block.lines()[0].text().trim(), "Qⁱ");
        assert_eq!(block.lines()[3].text().trim(), "[L, dk]");
    }

    #[test]
    fn test_row_labels_are_right_aligned_and_truncated() {
        let grid = BlockGrid::new(2, 2, Tone::Neutral, "X").row_labels(["a", "embedding"]);
        let block = grid.to_block();
        assert_eq!(block.lines()[1].text(), "      a ██");
        assert_eq!(block.lines()[2].text(), "embeddi ██");
    }
}
