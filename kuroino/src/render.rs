use crate::config::Settings;
use crate::mapper::{CellAddress, Grid, Viewport};
use crate::model::{date_label, SheetData};
use chrono::{Datelike, Weekday};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

/// Sheet pixels per terminal row; a terminal column is one pixel wide.
/// Terminal glyphs are roughly twice as tall as wide, so square cells stay square.
pub const ROW_PX: i32 = 2;

const TITLE_ROWS: u16 = 1;
const DATE_HEADER_ROWS: u16 = 2;
const STATUS_ROWS: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub struct CellBuffer {
    pub w: u16,
    pub h: u16,
    pub cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        if x < self.w && y < self.h {
            self.cells.get(self.idx(x, y)).copied()
        } else {
            None
        }
    }
    pub fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            if let Some(slot) = self.cells.get_mut(i) {
                *slot = c;
            }
        }
    }
    pub fn set_bg(&mut self, x: u16, y: u16, bg: Color) {
        if let Some(mut c) = self.get(x, y) {
            c.bg = bg;
            self.set(x, y, c);
        }
    }
    pub fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            *c = Cell {
                bg,
                ..Cell::default()
            };
        }
    }
}

pub struct Terminal {
    out: io::Stdout,
    pub cols: u16,
    pub rows: u16,
    prev: CellBuffer,
    pub cur: CellBuffer,
}

impl Terminal {
    pub fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            EnableMouseCapture,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            DisableMouseCapture,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    pub fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for (i, c) in self.cur.cells.iter().enumerate() {
            if self.prev.cells.get(i) == Some(c) {
                continue;
            }
            let x = (i % self.cols.max(1) as usize) as u16;
            let y = (i / self.cols.max(1) as usize) as u16;
            queue!(self.out, cursor::MoveTo(x, y))?;
            if last_fg != Some(c.fg) {
                queue!(self.out, SetForegroundColor(c.fg))?;
                last_fg = Some(c.fg);
            }
            if last_bg != Some(c.bg) {
                queue!(self.out, SetBackgroundColor(c.bg))?;
                last_bg = Some(c.bg);
            }
            queue!(self.out, Print(c.ch))?;
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Screen layout
------------------------------ */

/// Where the scrollable sheet sits on screen, in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub sheet_x: u16,
    pub sheet_y: u16,
    pub sheet_w: u16,
    pub sheet_h: u16,
}

impl Layout {
    pub fn compute(cols: u16, rows: u16, sheet: &SheetData) -> Self {
        let name_w = u16::try_from(sheet.longest_name()).unwrap_or(u16::MAX);
        let header_w = name_w.saturating_add(1).clamp(4, 16).min(cols / 2);
        let sheet_y = TITLE_ROWS + DATE_HEADER_ROWS;
        Self {
            sheet_x: header_w,
            sheet_y,
            sheet_w: cols.saturating_sub(header_w),
            sheet_h: rows.saturating_sub(sheet_y + STATUS_ROWS),
        }
    }

    /// Viewport extent of the sheet area in sheet pixels.
    pub fn viewport_size(&self) -> (i32, i32) {
        (i32::from(self.sheet_w), i32::from(self.sheet_h) * ROW_PX)
    }

    /// Sheet pixel under a terminal position, or `None` outside the sheet area.
    pub fn to_sheet(&self, vp: &Viewport, col: u16, row: u16) -> Option<(i32, i32)> {
        if col < self.sheet_x
            || row < self.sheet_y
            || col >= self.sheet_x + self.sheet_w
            || row >= self.sheet_y + self.sheet_h
        {
            return None;
        }
        let px = vp.scroll_x + i32::from(col - self.sheet_x);
        let py = vp.scroll_y + i32::from(row - self.sheet_y) * ROW_PX;
        Some((px, py))
    }

    fn screen_x(&self, scroll_x: i32, px: i32) -> Option<u16> {
        let rel = px - scroll_x;
        if rel < 0 || rel >= i32::from(self.sheet_w) {
            return None;
        }
        u16::try_from(rel).ok().map(|r| self.sheet_x + r)
    }

    fn screen_y(&self, scroll_y: i32, py: i32) -> Option<u16> {
        let rel = (py - scroll_y).div_euclid(ROW_PX);
        if rel < 0 || rel >= i32::from(self.sheet_h) {
            return None;
        }
        u16::try_from(rel).ok().map(|r| self.sheet_y + r)
    }
}

/* -----------------------------
   Sheet drawing
------------------------------ */

pub struct Frame<'a> {
    pub sheet: &'a SheetData,
    pub viewport: Viewport,
    /// Offset the header panels follow; kept in step by the scroll callback.
    pub header_scroll: (i32, i32),
    pub focus: Option<CellAddress>,
    pub pressed: bool,
    pub status: &'a str,
    pub settings: &'a Settings,
}

struct Palette {
    fg: Color,
    bg: Color,
    grid: Color,
    band: Color,
    hot: Color,
    saturday: Color,
    sunday: Color,
}

impl Palette {
    fn new(color: bool) -> Self {
        if color {
            Self {
                fg: Color::White,
                bg: Color::Black,
                grid: Color::Rgb {
                    r: 200,
                    g: 200,
                    b: 200,
                },
                band: Color::Rgb {
                    r: 48,
                    g: 48,
                    b: 0,
                },
                hot: Color::Rgb {
                    r: 112,
                    g: 112,
                    b: 0,
                },
                saturday: Color::Rgb {
                    r: 120,
                    g: 160,
                    b: 255,
                },
                sunday: Color::Rgb {
                    r: 255,
                    g: 120,
                    b: 120,
                },
            }
        } else {
            Self {
                fg: Color::White,
                bg: Color::Black,
                grid: Color::White,
                band: Color::DarkGrey,
                hot: Color::Grey,
                saturday: Color::White,
                sunday: Color::White,
            }
        }
    }
}

pub fn draw_frame(buf: &mut CellBuffer, layout: &Layout, f: &Frame<'_>) {
    let pal = Palette::new(f.settings.enable_color);
    buf.clear(pal.bg);

    let title = format!(
        "Kuroino  |  {}  |  {} members × {} days",
        f.sheet.title,
        f.sheet.entries.len(),
        f.sheet.dates.len()
    );
    draw_text(buf, 1, 0, &title, pal.fg, pal.bg);

    let grid = f.sheet.grid();
    let range = grid.visible_range(&f.viewport);
    let cs = grid.cell_size;
    let vp = f.viewport;

    /*  Marks  */
    for row in range.rows() {
        for col in range.cols() {
            let addr = CellAddress::new(row, col);
            let Some(mark) = f.sheet.mark(addr) else {
                continue;
            };
            let (ox, oy) = grid.origin_of(addr);
            let w = i32::try_from(mark.chars().count()).unwrap_or(cs);
            let px = ox + (cs - w + 1) / 2;
            let py = oy + cs / 2;
            let Some(ty) = layout.screen_y(vp.scroll_y, py) else {
                continue;
            };
            for (i, ch) in mark.chars().enumerate() {
                let Ok(i) = i32::try_from(i) else { break };
                if let Some(tx) = layout.screen_x(vp.scroll_x, px + i) {
                    buf.set(tx, ty, Cell::new(ch, pal.fg, pal.bg));
                }
            }
        }
    }

    /*  Grid  */
    for row in range.grid_rows() {
        let y = i32::try_from(row).unwrap_or(i32::MAX).saturating_mul(cs);
        let Some(ty) = layout.screen_y(vp.scroll_y, y) else {
            continue;
        };
        for tx in layout.sheet_x..layout.sheet_x + layout.sheet_w {
            buf.set(tx, ty, Cell::new('─', pal.grid, pal.bg));
        }
    }
    for col in range.grid_cols() {
        let x = i32::try_from(col).unwrap_or(i32::MAX).saturating_mul(cs);
        let Some(tx) = layout.screen_x(vp.scroll_x, x) else {
            continue;
        };
        for ty in layout.sheet_y..layout.sheet_y + layout.sheet_h {
            let ch = match buf.get(tx, ty) {
                Some(c) if c.ch == '─' => '┼',
                _ => '│',
            };
            buf.set(tx, ty, Cell::new(ch, pal.grid, pal.bg));
        }
    }

    /*  Focus  */
    if let Some(focus) = f.focus {
        highlight_focus(buf, layout, &grid, vp, focus, f.pressed, &pal);
    }

    draw_headers(buf, layout, f, &pal);
    draw_text(
        buf,
        1,
        buf.h.saturating_sub(1),
        f.status,
        pal.fg,
        pal.bg,
    );
}

fn highlight_focus(
    buf: &mut CellBuffer,
    layout: &Layout,
    grid: &Grid,
    vp: Viewport,
    focus: CellAddress,
    pressed: bool,
    pal: &Palette,
) {
    let (fx, fy) = grid.origin_of(focus);
    let cs = grid.cell_size;
    for ty in layout.sheet_y..layout.sheet_y + layout.sheet_h {
        for tx in layout.sheet_x..layout.sheet_x + layout.sheet_w {
            let Some((px, py)) = layout.to_sheet(&vp, tx, ty) else {
                continue;
            };
            let in_row = py >= fy && py < fy + cs;
            let in_col = px >= fx && px < fx + cs;
            if pressed && in_row && in_col {
                buf.set_bg(tx, ty, pal.hot);
            } else if in_row || in_col {
                buf.set_bg(tx, ty, pal.band);
            }
        }
    }
}

fn draw_headers(buf: &mut CellBuffer, layout: &Layout, f: &Frame<'_>, pal: &Palette) {
    let grid = f.sheet.grid();
    let cs = grid.cell_size;
    let (hx, hy) = f.header_scroll;
    let header = Viewport::new(hx, hy, f.viewport.width, f.viewport.height);
    // each header follows its own axis, even while the other one is empty
    let date_cols = Grid::new(cs, grid.rows.max(1), grid.cols).visible_range(&header);
    let name_rows = Grid::new(cs, grid.rows, grid.cols.max(1)).visible_range(&header);

    for col in date_cols.cols() {
        let Some(date) = f.sheet.dates.get(col) else {
            continue;
        };
        let (label, wd) = date_label(*date);
        let fg = match date.weekday() {
            Weekday::Sat => pal.saturday,
            Weekday::Sun => pal.sunday,
            _ => pal.fg,
        };
        let x0 = i32::try_from(col).unwrap_or(i32::MAX).saturating_mul(cs) + 1;
        let max = usize::try_from(cs - 1).unwrap_or(0);
        for (i, ch) in label.chars().take(max).enumerate() {
            let Ok(i) = i32::try_from(i) else { break };
            if let Some(tx) = layout.screen_x(hx, x0 + i) {
                buf.set(tx, TITLE_ROWS, Cell::new(ch, fg, pal.bg));
            }
        }
        if let Some(tx) = layout.screen_x(hx, x0 + (cs - 1) / 2) {
            buf.set(tx, TITLE_ROWS + 1, Cell::new(wd, fg, pal.bg));
        }
    }

    let name_w = usize::from(layout.sheet_x.saturating_sub(1));
    for row in name_rows.rows() {
        let Some(entry) = f.sheet.entries.get(row) else {
            continue;
        };
        let y = i32::try_from(row).unwrap_or(i32::MAX).saturating_mul(cs) + cs / 2;
        let Some(ty) = layout.screen_y(hy, y) else {
            continue;
        };
        let name: String = entry.name.chars().take(name_w).collect();
        let hot = f.focus.is_some_and(|a| a.row == row);
        let bg = if hot { pal.band } else { pal.bg };
        draw_text(buf, 0, ty, &name, pal.fg, bg);
    }
}

pub fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(u16::try_from(i).unwrap_or(u16::MAX));
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell::new(ch, fg, bg));
    }
}
