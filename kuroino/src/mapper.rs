//! Pixel ↔ cell mapping for a square-celled sheet seen through a scroll viewport.

use serde::{Deserialize, Serialize};

/// A (row, column) pair that is known to lie inside its grid.
///
/// "No focus" is `None` at every API boundary; the sheet's observers that want
/// the classic `(-1, -1)` pair can ask for [`CellAddress::to_signed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn to_signed(addr: Option<CellAddress>) -> (i64, i64) {
        match addr {
            Some(a) => (
                i64::try_from(a.row).unwrap_or(i64::MAX),
                i64::try_from(a.col).unwrap_or(i64::MAX),
            ),
            None => (-1, -1),
        }
    }
}

/// Visible pixel rectangle of the scroll container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(scroll_x: i32, scroll_y: i32, width: i32, height: i32) -> Self {
        Self {
            scroll_x,
            scroll_y,
            width,
            height,
        }
    }
}

/// Geometry of the logical sheet: `rows × cols` square cells of `cell_size` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub cell_size: i32,
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn new(cell_size: i32, rows: usize, cols: usize) -> Self {
        Self {
            cell_size,
            rows,
            cols,
        }
    }

    pub fn has_cells(&self) -> bool {
        self.cell_size > 0 && self.rows > 0 && self.cols > 0
    }

    /// Address of the cell under pixel `(x, y)`, or `None` when the point is
    /// outside the sheet (negative coordinates included).
    pub fn cell_at(&self, x: i32, y: i32) -> Option<CellAddress> {
        if !self.has_cells() {
            return None;
        }
        let row = usize::try_from(y.div_euclid(self.cell_size)).ok()?;
        let col = usize::try_from(x.div_euclid(self.cell_size)).ok()?;
        if row < self.rows && col < self.cols {
            Some(CellAddress { row, col })
        } else {
            None
        }
    }

    /// Inclusive row/column span that intersects `vp`, clamped to the sheet.
    pub fn visible_range(&self, vp: &Viewport) -> VisibleRange {
        if !self.has_cells() {
            return VisibleRange::EMPTY;
        }
        let cs = self.cell_size;
        let last_row = clamp_index(self.rows) - 1;
        let last_col = clamp_index(self.cols) - 1;

        VisibleRange {
            start_row: vp.scroll_y.div_euclid(cs).max(0),
            end_row: far_edge(vp.scroll_y, vp.height).div_euclid(cs).min(last_row),
            start_col: vp.scroll_x.div_euclid(cs).max(0),
            end_col: far_edge(vp.scroll_x, vp.width).div_euclid(cs).min(last_col),
        }
    }

    /// Pixel origin (top-left corner) of a cell.
    pub fn origin_of(&self, addr: CellAddress) -> (i32, i32) {
        (
            clamp_index(addr.col).saturating_mul(self.cell_size),
            clamp_index(addr.row).saturating_mul(self.cell_size),
        )
    }

    /// Total pixel extent including the closing grid line. Each axis is sized
    /// on its own, so dates without members still scroll sideways.
    pub fn content_size(&self) -> (i32, i32) {
        if self.cell_size <= 0 {
            return (1, 1);
        }
        (
            clamp_index(self.cols).saturating_mul(self.cell_size) + 1,
            clamp_index(self.rows).saturating_mul(self.cell_size) + 1,
        )
    }
}

fn far_edge(origin: i32, extent: i32) -> i32 {
    origin.saturating_add(extent).saturating_sub(1)
}

fn clamp_index(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Inclusive cell span; `end < start` on either axis means nothing is visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRange {
    pub start_row: i32,
    pub end_row: i32,
    pub start_col: i32,
    pub end_col: i32,
}

impl VisibleRange {
    pub const EMPTY: VisibleRange = VisibleRange {
        start_row: 0,
        end_row: -1,
        start_col: 0,
        end_col: -1,
    };

    pub fn is_empty(&self) -> bool {
        self.end_row < self.start_row || self.end_col < self.start_col
    }

    pub fn rows(&self) -> impl Iterator<Item = usize> {
        span(self.start_row, self.end_row, self.is_empty())
    }

    pub fn cols(&self) -> impl Iterator<Item = usize> {
        span(self.start_col, self.end_col, self.is_empty())
    }

    /// Row boundaries to stroke: one past `end_row` so the last visible cell is closed.
    pub fn grid_rows(&self) -> impl Iterator<Item = usize> {
        span(self.start_row, self.end_row + 1, self.is_empty())
    }

    pub fn grid_cols(&self) -> impl Iterator<Item = usize> {
        span(self.start_col, self.end_col + 1, self.is_empty())
    }

    pub fn contains(&self, addr: CellAddress) -> bool {
        let (Ok(row), Ok(col)) = (i32::try_from(addr.row), i32::try_from(addr.col)) else {
            return false;
        };
        !self.is_empty()
            && (self.start_row..=self.end_row).contains(&row)
            && (self.start_col..=self.end_col).contains(&col)
    }
}

fn span(start: i32, end: i32, empty: bool) -> impl Iterator<Item = usize> {
    let (start, end) = if empty { (1, 0) } else { (start, end) };
    (start..=end).filter_map(|i| usize::try_from(i).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_division_rejects_small_negative_offsets() {
        let g = Grid::new(40, 10, 10);
        // Truncating division would land on row 0 here.
        assert_eq!(g.cell_at(5, -1), None);
        assert_eq!(g.cell_at(-1, 5), None);
        assert_eq!(g.cell_at(0, 0), Some(CellAddress::new(0, 0)));
    }

    #[test]
    fn zero_sized_cells_address_nothing() {
        let g = Grid::new(0, 4, 4);
        assert_eq!(g.cell_at(0, 0), None);
        assert!(g.visible_range(&Viewport::new(0, 0, 100, 100)).is_empty());
        assert_eq!(g.content_size(), (1, 1));
    }

    #[test]
    fn empty_axis_keeps_the_other_extent() {
        assert_eq!(Grid::new(6, 0, 30).content_size(), (181, 1));
        assert_eq!(Grid::new(6, 4, 0).content_size(), (1, 25));
        assert!(Grid::new(6, 0, 30)
            .visible_range(&Viewport::new(0, 0, 60, 60))
            .is_empty());
    }

    #[test]
    fn grid_lines_close_the_last_visible_cell() {
        let g = Grid::new(10, 3, 3);
        let r = g.visible_range(&Viewport::new(0, 0, 100, 100));
        assert_eq!(r.rows().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(r.grid_rows().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(VisibleRange::EMPTY.grid_cols().count(), 0);
    }

    #[test]
    fn signed_form_uses_minus_one_sentinel() {
        assert_eq!(CellAddress::to_signed(None), (-1, -1));
        assert_eq!(CellAddress::to_signed(Some(CellAddress::new(3, 2))), (3, 2));
    }
}
