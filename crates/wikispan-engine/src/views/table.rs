//! Tables and their cells.

use std::ops::Range;

use wikispan_syntax::tables::{self, CellLayout, TableLayout};
use wikispan_syntax::{ConstructKind, Purpose, attrs};

use super::attributes::{AttrRegion, HasAttributes};
use super::{own_shadow, typed_view};
use crate::discovery::{self, ScopedScan};
use crate::{EditError, WikiText};

typed_view!(
    /// `{| ... |}`.
    Table,
    ConstructKind::Table,
    standalone
);

typed_view!(
    /// One cell of a table, from its delimiter to the next one.
    Cell,
    ConstructKind::TableCell
);

/// How [`Table::data`] reads cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataOptions {
    /// Strip leading spaces and tabs and trailing whitespace.
    pub strip: bool,
    /// Apply `colspan` and `rowspan`, padding short rows with `None`.
    pub span: bool,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self {
            strip: true,
            span: true,
        }
    }
}

const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// A table's own text, its parts shadow and its layout.
struct Laid {
    text: String,
    shadow: String,
    layout: TableLayout,
    nested: Vec<Range<usize>>,
}

impl Table {
    fn laid(&self) -> Laid {
        let (text, shadow, layers) = own_shadow(self, Purpose::Parts);
        let layout = tables::layout(&shadow);
        let nested = layers
            .tables
            .iter()
            .filter(|range| **range != (0..text.len()))
            .cloned()
            .collect();
        Laid {
            text,
            shadow,
            layout,
            nested,
        }
    }

    /// The cells, row by row.
    pub fn cells(&self) -> Vec<Vec<Cell>> {
        let Some(span) = self.span() else {
            return Vec::new();
        };
        let laid = self.laid();
        let shift = |r: &Range<usize>| span.start + r.start..span.start + r.end;
        let found: Vec<Range<usize>> = laid.layout.cells().map(|c| shift(&c.range)).collect();
        let foreign: Vec<Range<usize>> = laid.nested.iter().map(shift).collect();
        let ids = discovery::reconcile_scoped(
            &mut self.document().borrow_mut(),
            &ScopedScan {
                kind: ConstructKind::TableCell,
                region: span,
                found: &found,
                valid: &[],
                foreign: &foreign,
            },
        );
        let mut ids = ids.into_iter();
        laid.layout
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|_| ids.next())
                    .map(|id| Cell::from_view(self.sibling(id)))
                    .collect()
            })
            .collect()
    }

    /// The cell at `row`, `column`, counting cells as written (no spans).
    pub fn cell(&self, row: usize, column: usize) -> Option<Cell> {
        self.cells().into_iter().nth(row)?.into_iter().nth(column)
    }

    /// Cell values, row by row.
    pub fn data(&self, options: &DataOptions) -> Vec<Vec<Option<String>>> {
        let laid = self.laid();
        let value = |cell: &CellLayout| {
            let value = &laid.text[cell.value.clone()];
            if options.strip {
                value.trim_start_matches([' ', '\t']).trim_end().to_owned()
            } else {
                value.to_owned()
            }
        };
        if !options.span {
            return laid
                .layout
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| Some(value(cell))).collect())
                .collect();
        }
        let rows = laid
            .layout
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        let span = |name: &str| {
                            let region = cell.attrs.clone()?;
                            let parsed = attrs::parse(&laid.shadow, region);
                            let attr = attrs::find(&laid.shadow, &parsed, name)?;
                            Some(laid.text[attr.value.clone()?].to_owned())
                        };
                        SpannedCell {
                            value: value(cell),
                            colspan: parse_span(span("colspan"), 1).clamp(1, MAX_COLSPAN),
                            rowspan: parse_span(span("rowspan"), 1).min(MAX_ROWSPAN),
                        }
                    })
                    .collect()
            })
            .collect();
        span_grid(rows)
    }

    pub fn caption(&self) -> Option<String> {
        let laid = self.laid();
        let caption = laid.layout.caption?;
        Some(laid.text[caption.value].to_owned())
    }

    /// Replace the caption, adding one after the table start if missing.
    pub fn set_caption(&self, caption: &str) -> Result<(), EditError> {
        let layout = self.laid().layout;
        match layout.caption {
            Some(existing) => self.splice_local(existing.value, caption),
            None => {
                let at = layout.head_end;
                self.splice_local(at..at, &format!("\n|+{caption}"))
            }
        }
    }

    pub fn caption_attrs(&self) -> Option<String> {
        let laid = self.laid();
        let attrs = laid.layout.caption?.attrs?;
        Some(laid.text[attrs].to_owned())
    }

    pub fn set_caption_attrs(&self, attrs: &str) -> Result<(), EditError> {
        let layout = self.laid().layout;
        match layout.caption {
            Some(existing) => match existing.attrs {
                Some(range) => self.splice_local(range, attrs),
                None => {
                    let at = existing.value.start;
                    self.splice_local(at..at, &format!("{attrs}|"))
                }
            },
            None => {
                let at = layout.head_end;
                self.splice_local(at..at, &format!("\n|+{attrs}|"))
            }
        }
    }

    /// The number of tables this one is nested in.
    pub fn nesting_level(&self) -> usize {
        self.ancestors(Some(ConstructKind::Table)).len()
    }
}

impl HasAttributes for Table {
    fn attr_owner(&self) -> &WikiText {
        self
    }

    fn attr_region(&self) -> AttrRegion {
        let laid = self.laid();
        AttrRegion {
            range: laid.layout.attrs,
            text: laid.text,
            shadow: laid.shadow,
            missing: false,
        }
    }
}

impl Cell {
    /// This cell's layout within its table, in the cell's own offsets, with
    /// the cell's slices of the table text and shadow.
    fn laid(&self) -> Option<(String, String, CellLayout)> {
        let span = self.span()?;
        let table = self
            .ancestors(Some(ConstructKind::Table))
            .into_iter()
            .next()?;
        let base = table.span()?.start;
        let laid = Table::from_view(table).laid();
        let own = span.start - base..span.end - base;
        let cell = laid.layout.cells().find(|c| c.range == own)?.clone();
        let local = |r: Range<usize>| r.start - own.start..r.end - own.start;
        Some((
            laid.text[own.clone()].to_owned(),
            laid.shadow[own.clone()].to_owned(),
            CellLayout {
                range: local(cell.range),
                header: cell.header,
                attrs: cell.attrs.map(local),
                value: local(cell.value),
            },
        ))
    }

    pub fn value(&self) -> String {
        match self.laid() {
            Some((text, _, cell)) => text[cell.value].to_owned(),
            None => self.text(),
        }
    }

    pub fn set_value(&self, value: &str) -> Result<(), EditError> {
        match self.laid() {
            Some((_, _, cell)) => self.splice_local(cell.value, value),
            None => self.set_text(value),
        }
    }

    /// Whether the cell is a `!` header cell.
    pub fn is_header(&self) -> bool {
        self.laid().is_some_and(|(_, _, cell)| cell.header)
    }
}

impl HasAttributes for Cell {
    fn attr_owner(&self) -> &WikiText {
        self
    }

    fn attr_region(&self) -> AttrRegion {
        match self.laid() {
            Some((text, shadow, cell)) => {
                let (range, missing) = match cell.attrs {
                    Some(attrs) => (attrs, false),
                    None => (cell.value.start..cell.value.start, true),
                };
                AttrRegion {
                    text,
                    shadow,
                    range,
                    missing,
                }
            }
            None => AttrRegion {
                text: String::new(),
                shadow: String::new(),
                range: Range::default(),
                missing: false,
            },
        }
    }

    /// A cell without attributes gets an empty attribute part before its value.
    fn open_attrs(&self, region: &AttrRegion) -> Result<(), EditError> {
        let at = region.range.start;
        self.splice_local(at..at, "|")
    }
}

/// Leading digits of a span attribute; anything else reads as `default`.
fn parse_span(value: Option<String>, default: usize) -> usize {
    let Some(value) = value else {
        return default;
    };
    let digits: String = value
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(default)
}

struct SpannedCell {
    value: String,
    colspan: usize,
    /// 0 grows the cell to the end of the row group.
    rowspan: usize,
}

/// Lay cells out on a grid following the HTML table model.
fn span_grid(rows: Vec<Vec<SpannedCell>>) -> Vec<Vec<Option<String>>> {
    let mut grid: Vec<Vec<Option<String>>> = Vec::new();
    let mut width = 0;
    let mut height = 0;
    // Cells with rowspan=0: value, first column, colspan.
    let mut growing: Vec<(String, usize, usize)> = Vec::new();

    fn put(grid: &mut Vec<Vec<Option<String>>>, x: usize, y: usize, value: &str) {
        if grid.len() <= y {
            grid.resize_with(y + 1, Vec::new);
        }
        let row = &mut grid[y];
        if row.len() <= x {
            row.resize(x + 1, None);
        }
        row[x] = Some(value.to_owned());
    }

    fn grow(grid: &mut Vec<Vec<Option<String>>>, growing: &[(String, usize, usize)], y: usize) {
        for (value, x, colspan) in growing {
            for dx in 0..*colspan {
                put(grid, x + dx, y, value);
            }
        }
    }

    let row_count = rows.len();
    for (y, row) in rows.into_iter().enumerate() {
        if y == height {
            height += 1;
        }
        grow(&mut grid, &growing, y);
        let mut x = 0;
        for cell in row {
            while x < width
                && grid
                    .get(y)
                    .and_then(|r| r.get(x))
                    .is_some_and(Option::is_some)
            {
                x += 1;
            }
            if x == width {
                width += 1;
            }
            width = width.max(x + cell.colspan);
            let covered = cell.rowspan.max(1);
            height = height.max(y + covered);
            for dy in 0..covered {
                for dx in 0..cell.colspan {
                    put(&mut grid, x + dx, y + dy, &cell.value);
                }
            }
            if cell.rowspan == 0 {
                growing.push((cell.value, x, cell.colspan));
            }
            x += cell.colspan;
        }
    }
    for y in row_count..height {
        grow(&mut grid, &growing, y);
    }

    grid.resize_with(height, Vec::new);
    for row in &mut grid {
        row.resize(width, None);
    }
    grid
}
