use crate::config::{
    init_logging, load_settings, project_paths, save_settings_atomic, Paths, Settings,
};
use crate::error::SheetError;
use crate::input::{collect_input_nonblocking, map_event, SheetAction};
use crate::mapper::CellAddress;
use crate::model::SheetData;
use crate::render::{draw_frame, Frame, Layout, Terminal, ROW_PX};
use crate::storage::{load_sheet, save_atomic};
use crate::view::{FocusObserver, SheetView};
use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const HINT: &str = "click a cell to mark | drag/arrows/wheel scroll | esc clear | q quit";

#[derive(Parser, Debug, Clone)]
#[command(name = "kuroino")]
#[command(about = "Touch-style attendance sheet for the terminal", long_about = None)]
pub struct Args {
    /// Sheet file (JSON). Defaults to sheet.json in the data directory.
    #[arg(long)]
    pub sheet: Option<PathBuf>,

    /// Member names for a new sheet, comma separated
    #[arg(long, value_delimiter = ',')]
    pub names: Vec<String>,

    /// Number of date columns for a new sheet
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// First date of a new sheet (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Title of a new sheet
    #[arg(long, default_value = "Attendance")]
    pub title: String,

    /// Cell size in sheet pixels (a terminal column is 1px, a row 2px)
    #[arg(long)]
    pub cell_size: Option<i32>,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    pub mono: bool,
}

/// Host side of the sheet: owns the data and reacts to focus, click and scroll.
pub struct Desk {
    pub sheet: SheetData,
    pub symbols: Vec<String>,
    pub status: String,
    pub header_scroll: (i32, i32),
    pub dirty: bool,
}

impl Desk {
    pub fn new(sheet: SheetData, symbols: Vec<String>) -> Self {
        Self {
            sheet,
            symbols,
            status: HINT.to_string(),
            header_scroll: (0, 0),
            dirty: false,
        }
    }
}

impl FocusObserver for Desk {
    fn focus_changed(&mut self, focus: Option<CellAddress>) {
        self.status = match focus.and_then(|a| self.sheet.describe(a)) {
            Some(d) => d,
            None => HINT.to_string(),
        };
    }

    fn cell_committed(&mut self, addr: CellAddress) {
        let mark = self.sheet.cycle_mark(addr, &self.symbols);
        self.dirty = true;
        let desc = self.sheet.describe(addr).unwrap_or_default();
        let shown = mark.as_deref().unwrap_or("-");
        log::info!("mark ({}, {}) -> {shown}", addr.row, addr.col);
        self.status = format!("{desc}: {shown}");
    }

    fn scroll_changed(&mut self, x: i32, y: i32) {
        self.header_scroll = (x, y);
    }
}

pub fn open_or_create(
    args: &Args,
    settings: &Settings,
    path: &Path,
) -> anyhow::Result<SheetData> {
    let mut sheet = match load_sheet(path)? {
        Some(s) => {
            log::info!("loaded sheet {}", path.display());
            s
        }
        None => {
            let start = args
                .start
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            let names: Vec<String> = if args.names.is_empty() {
                (1..=8).map(|i| format!("Member {i}")).collect()
            } else {
                args.names.iter().map(|n| n.trim().to_string()).collect()
            };
            log::info!(
                "new sheet {} ({} members, {} days from {start})",
                path.display(),
                names.len(),
                args.days
            );
            SheetData::blank(&args.title, start, args.days, &names, settings.cell_size)?
        }
    };
    if let Some(cs) = args.cell_size {
        sheet.cell_size = cs;
    }
    if sheet.cell_size <= 0 {
        return Err(SheetError::CellSize(sheet.cell_size).into());
    }
    Ok(sheet)
}

/// Writes the sheet back when it changed. Returns whether a write happened.
pub fn save_if_dirty(path: &Path, desk: &mut Desk) -> anyhow::Result<bool> {
    if !desk.dirty {
        return Ok(false);
    }
    save_atomic(path, &desk.sheet)?;
    desk.dirty = false;
    log::info!("saved {}", path.display());
    Ok(true)
}

/// Feeds one input action through the sheet view. `drag_from` is the terminal
/// position of the last press or drag step. Returns `true` when the user asked
/// to quit.
pub fn apply_action(
    view: &mut SheetView,
    desk: &mut Desk,
    layout: &Layout,
    drag_from: &mut Option<(u16, u16)>,
    action: SheetAction,
) -> bool {
    let grid = desk.sheet.grid();
    let content = grid.content_size();
    match action {
        SheetAction::PointerDown { col, row } => {
            *drag_from = Some((col, row));
            if let Some((px, py)) = layout.to_sheet(&view.viewport(), col, row) {
                view.pointer_down(px, py, grid, desk);
            }
        }
        SheetAction::PointerUp => {
            *drag_from = None;
            view.pointer_up(desk);
        }
        SheetAction::Drag { col, row } => {
            let Some((c0, r0)) = *drag_from else {
                return false;
            };
            view.pointer_cancel(desk);
            let dx = i32::from(c0) - i32::from(col);
            let dy = (i32::from(r0) - i32::from(row)) * ROW_PX;
            view.scroll_by(dx, dy, content, desk);
            *drag_from = Some((col, row));
        }
        SheetAction::Cancel => {
            if !view.pointer_cancel(desk) {
                view.set_focus(None);
                desk.status = HINT.to_string();
            }
        }
        SheetAction::ScrollCells { dx, dy } => {
            let cs = grid.cell_size;
            view.scroll_by(dx * cs, dy * cs, content, desk);
        }
        SheetAction::ScrollPage { dy } => {
            let page = view.viewport().height;
            view.scroll_by(0, dy * page, content, desk);
        }
        SheetAction::Home => {
            view.scroll_to(0, 0, content, desk);
        }
        SheetAction::Quit => return true,
    }
    false
}

pub struct App {
    settings: Settings,
    paths: Paths,
    sheet_path: PathBuf,
    desk: Desk,
    view: SheetView,
    layout: Layout,
    term: Terminal,
    drag_from: Option<(u16, u16)>,
    should_quit: bool,
}

impl App {
    fn init(args: Args) -> anyhow::Result<Self> {
        let paths = project_paths()?;
        init_logging(&paths.log_path)?;
        let mut settings = load_settings(&paths.settings_path);
        if args.mono {
            settings.enable_color = false;
        }

        let sheet_path = args.sheet.clone().unwrap_or_else(|| paths.sheet_path.clone());
        let sheet = open_or_create(&args, &settings, &sheet_path)?;
        let desk = Desk::new(sheet, settings.symbols.clone());

        let term = Terminal::begin()?;
        let layout = Layout::compute(term.cols, term.rows, &desk.sheet);
        let mut view = SheetView::new();
        let (w, h) = layout.viewport_size();
        view.resize(w, h, desk.sheet.grid().content_size());

        Ok(Self {
            settings,
            paths,
            sheet_path,
            desk,
            view,
            layout,
            term,
            drag_from: None,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let result = self.run_loop();
        if let Err(e) = &result {
            log::error!("main loop failed: {e:#}");
        }
        let ended = self.term.end();

        // written whether or not the loop failed
        let saved = save_if_dirty(&self.sheet_path, &mut self.desk)
            .and_then(|_| save_settings_atomic(&self.paths.settings_path, &self.settings));
        result.and(ended).and(saved)
    }

    fn run_loop(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                self.relayout();
            }

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event(&ev) {
                    self.should_quit = apply_action(
                        &mut self.view,
                        &mut self.desk,
                        &self.layout,
                        &mut self.drag_from,
                        action,
                    );
                }
                if self.should_quit {
                    break;
                }
            }

            self.render_frame()?;
            spin_sleep(frame_dt, Instant::now());
        }
        Ok(())
    }

    fn relayout(&mut self) {
        self.layout = Layout::compute(self.term.cols, self.term.rows, &self.desk.sheet);
        let (w, h) = self.layout.viewport_size();
        let content = self.desk.sheet.grid().content_size();
        self.view.resize(w, h, content);
        let vp = self.view.viewport();
        self.desk.scroll_changed(vp.scroll_x, vp.scroll_y);
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let frame = Frame {
            sheet: &self.desk.sheet,
            viewport: self.view.viewport(),
            header_scroll: self.desk.header_scroll,
            focus: self.view.focus(),
            pressed: self.view.is_pressed(),
            status: &self.desk.status,
            settings: &self.settings,
        };
        draw_frame(&mut self.term.cur, &self.layout, &frame);
        self.term.present()?;
        Ok(())
    }
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut app = App::init(args)?;
    app.run()
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
