use crate::engine::Target;
use crate::shell::{normalize, BombIndicator};
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

/// Surface pixels per terminal row; one terminal column is one pixel.
pub const ROW_PX: f32 = 2.0;
pub const HUD_ROWS: u16 = 1;
pub const FOOTER_ROWS: u16 = 1;

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

    /// The terminal bell stands in for every sound effect.
    pub fn bell(&mut self) -> anyhow::Result<()> {
        queue!(self.out, Print('\x07'))?;
        Ok(())
    }

    pub fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let (Some(&c), prev) = (self.cur.cells.get(i), self.prev.cells.get(i)) else {
                    continue;
                };
                if prev == Some(&c) {
                    continue;
                }

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
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Play surface
------------------------------ */

/// Terminal rows given to the targets; the HUD and footer are carved out
/// unless the game runs in simple mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    pub top: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Surface {
    pub fn compute(cols: u16, rows: u16, simple: bool) -> Self {
        if simple {
            return Self { top: 0, cols, rows };
        }
        Self {
            top: HUD_ROWS,
            cols,
            rows: rows.saturating_sub(HUD_ROWS + FOOTER_ROWS),
        }
    }

    /// Surface size in pixels.
    pub fn size(&self) -> (f32, f32) {
        (f32::from(self.cols), f32::from(self.rows) * ROW_PX)
    }

    /// Centre of a terminal cell in surface pixels, or `None` off the surface.
    pub fn to_pixel(&self, col: u16, row: u16) -> Option<(f32, f32)> {
        if col >= self.cols || row < self.top || row >= self.top + self.rows {
            return None;
        }
        Some((
            f32::from(col) + 0.5,
            (f32::from(row - self.top) + 0.5) * ROW_PX,
        ))
    }

    /// Terminal cell that shows engine coordinates `(x, y)`.
    pub fn to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let (w, h) = self.size();
        let s = w.min(h).max(1.0);
        let px = (x * s + w / 2.0).floor();
        let row = ((h / 2.0 - y * s) / ROW_PX).floor();
        if px < 0.0 || row < 0.0 || px >= w || row >= f32::from(self.rows) {
            return None;
        }
        Some((px as u16, self.top + row as u16))
    }
}

fn target_color(t: &Target, color: bool) -> Color {
    if !color {
        return Color::White;
    }
    // fades in over the first second
    let k = (t.age.min(60) as f32 / 60.0) * 0.6 + 0.4;
    Color::Rgb {
        r: (255.0 * k) as u8,
        g: (140.0 * k) as u8,
        b: (60.0 * k) as u8,
    }
}

pub fn draw_targets(buf: &mut CellBuffer, surface: &Surface, targets: &[Target], color: bool) {
    let (w, h) = surface.size();
    for row in surface.top..surface.top + surface.rows {
        for col in 0..surface.cols {
            let Some((px, py)) = surface.to_pixel(col, row) else {
                continue;
            };
            let (x, y) = normalize(px, py, w, h);
            if let Some(t) = targets.iter().find(|t| t.covers(x, y)) {
                let fg = target_color(t, color);
                buf.set(col, row, Cell::new('█', fg, Color::Black));
            }
        }
    }
    // centres, so targets smaller than a cell still show up
    for t in targets {
        if let Some((col, row)) = surface.to_cell(t.x, t.y) {
            let fg = target_color(t, color);
            buf.set(col, row, Cell::new('@', fg, Color::Black));
        }
    }
}

/* -----------------------------
   HUD
------------------------------ */

pub struct HudState<'a> {
    pub score: u64,
    pub bombs: BombIndicator,
    pub sound: bool,
    pub notice: Option<&'a str>,
    /// Only the notice line is drawn.
    pub simple: bool,
}

pub fn draw_hud(buf: &mut CellBuffer, hud: &HudState<'_>, color: bool) {
    let bg = Color::Black;
    let fg = Color::White;
    let dim = if color { Color::DarkGrey } else { Color::Grey };
    let footer_y = buf.h.saturating_sub(1);

    if hud.simple {
        if let Some(msg) = hud.notice {
            draw_notice(buf, footer_y, msg, color);
        }
        return;
    }

    draw_text(buf, 1, 0, &format!("Score {:>8}", hud.score), fg, bg);

    let bomb_fg = if hud.bombs.button_enabled { fg } else { dim };
    draw_text(buf, 18, 0, &format!("[b] Bomb x{}", hud.bombs.count), bomb_fg, bg);

    let sound = if hud.sound { "[s] Sound on " } else { "[s] Sound off" };
    draw_text(buf, 34, 0, sound, fg, bg);

    if let Some(msg) = hud.notice {
        draw_notice(buf, footer_y, msg, color);
    } else if hud.bombs.out_of_bombs_hint {
        draw_text(buf, 1, footer_y, "Out of bombs - come back tomorrow for more", dim, bg);
    } else {
        draw_text(
            buf,
            1,
            footer_y,
            "click targets | b bomb | n shake | s sound | a about | z simple | q quit",
            dim,
            bg,
        );
    }
}

fn draw_notice(buf: &mut CellBuffer, y: u16, msg: &str, color: bool) {
    let fg = if color { Color::Yellow } else { Color::White };
    draw_text(buf, 1, y, msg, fg, Color::Black);
}

pub fn draw_center_box(buf: &mut CellBuffer, title: &str, lines: &[String]) {
    let fg = Color::White;
    let bg = Color::Black;
    let bw = 64.min(buf.w.saturating_sub(4));
    let bh = 20.min(buf.h.saturating_sub(2));
    if bw < 4 || bh < 4 {
        return;
    }
    let x0 = (buf.w - bw) / 2;
    let y0 = (buf.h - bh) / 2;

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            let edge_x = x == x0 || x == x0 + bw - 1;
            let edge_y = y == y0 || y == y0 + bh - 1;
            let ch = match (edge_x, edge_y) {
                (true, true) if x == x0 && y == y0 => '┌',
                (true, true) if y == y0 => '┐',
                (true, true) if x == x0 => '└',
                (true, true) => '┘',
                (true, false) => '│',
                (false, true) => '─',
                (false, false) => ' ',
            };
            buf.set(x, y, Cell::new(ch, fg, bg));
        }
    }

    draw_text(buf, x0 + 2, y0 + 1, title, fg, bg);
    let inner = usize::from(bw - 4);
    for (i, line) in lines.iter().enumerate() {
        let Ok(i) = u16::try_from(i) else { break };
        let y = y0 + 3 + i;
        if y >= y0 + bh - 1 {
            break;
        }
        let clipped: String = line.chars().take(inner).collect();
        draw_text(buf, x0 + 2, y, &clipped, fg, bg);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Field, TargetEngine};

    #[test]
    fn surface_leaves_room_for_hud_unless_simple() {
        let framed = Surface {
            top: 1,
            cols: 80,
            rows: 22,
        };
        let full = Surface {
            top: 0,
            cols: 80,
            rows: 24,
        };
        assert_eq!(Surface::compute(80, 24, false), framed);
        assert_eq!(Surface::compute(80, 24, true), full);
    }

    #[test]
    fn pixel_and_cell_mapping_agree() {
        let s = Surface::compute(80, 24, false);
        assert_eq!(s.to_pixel(0, 0), None);
        assert_eq!(s.to_pixel(40, 12), Some((40.5, 23.0)));
        // engine origin sits in the middle of the surface
        assert_eq!(s.to_cell(0.0, 0.0), Some((40, 12)));
        assert_eq!(s.to_cell(5.0, 0.0), None);
    }

    #[test]
    fn tapped_cell_hits_the_drawn_target() {
        let s = Surface::compute(80, 24, false);
        let mut field = Field::new(1);
        field.place(0.1, -0.2);
        let mut buf = CellBuffer::new(80, 24);
        draw_targets(&mut buf, &s, field.targets(), true);

        let (col, row) = s.to_cell(0.1, -0.2).unwrap();
        assert_eq!(buf.get(col, row).unwrap().ch, '@');
        let (px, py) = s.to_pixel(col, row).unwrap();
        let (w, h) = s.size();
        let (x, y) = normalize(px, py, w, h);
        assert_eq!(field.judge_target(x, y), 1);
    }

    #[test]
    fn hud_shows_hint_when_out_of_bombs() {
        let mut buf = CellBuffer::new(80, 24);
        let hud = HudState {
            score: 7,
            bombs: BombIndicator::new(0),
            sound: false,
            notice: None,
            simple: false,
        };
        draw_hud(&mut buf, &hud, true);
        let footer: String = (0..80).map(|x| buf.get(x, 23).unwrap().ch).collect();
        assert!(footer.contains("Out of bombs"));
        assert_eq!(buf.get(18 + 4, 0).unwrap().fg, Color::DarkGrey);
    }

    #[test]
    fn simple_mode_keeps_only_the_notice() {
        let row = |buf: &CellBuffer, y: u16| -> String {
            (0..80).map(|x| buf.get(x, y).unwrap().ch).collect()
        };
        let mut buf = CellBuffer::new(80, 24);
        let mut hud = HudState {
            score: 7,
            bombs: BombIndicator::new(0),
            sound: true,
            notice: Some("Obtained 3 bombs!"),
            simple: true,
        };
        draw_hud(&mut buf, &hud, true);
        assert!(row(&buf, 23).contains("Obtained 3 bombs!"));
        assert_eq!(row(&buf, 0).trim(), "");

        hud.notice = None;
        let mut buf = CellBuffer::new(80, 24);
        draw_hud(&mut buf, &hud, true);
        assert_eq!(row(&buf, 23).trim(), "");
    }
}
