//! Sheet host behaviour and on-disk format.

use chrono::NaiveDate;
use kuroino::app::{apply_action, open_or_create, save_if_dirty, Args, Desk};
use kuroino::config::Settings;
use kuroino::error::SheetError;
use kuroino::input::SheetAction;
use kuroino::model::SheetData;
use kuroino::render::Layout;
use kuroino::storage::{load_sheet, save_atomic};
use kuroino::{CellAddress, FocusObserver, Grid, SheetView};
use std::fs;
use std::path::PathBuf;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kuroino-{tag}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn sheet() -> SheetData {
    let names = vec!["Aoi".to_string(), "Ren".to_string()];
    let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    SheetData::blank("club", start, 7, &names, 6).unwrap()
}

fn args() -> Args {
    Args {
        sheet: None,
        names: vec!["Aoi".to_string(), " Ren ".to_string()],
        days: 3,
        start: NaiveDate::from_ymd_opt(2024, 1, 8),
        title: "t".to_string(),
        cell_size: None,
        mono: false,
    }
}

#[test]
fn click_cycles_the_committed_cell() {
    let mut desk = Desk::new(sheet(), Settings::default().symbols);
    let mut view = SheetView::new();
    let grid = desk.sheet.grid();

    view.pointer_down(13, 7, grid, &mut desk);
    assert_eq!(desk.status, "Ren @ 2024-04-03 (Wed)");
    view.pointer_up(&mut desk);
    assert_eq!(desk.sheet.mark(CellAddress::new(1, 2)), Some("○"));
    assert!(desk.dirty);

    view.pointer_down(13, 7, grid, &mut desk);
    view.pointer_up(&mut desk);
    assert_eq!(desk.sheet.mark(CellAddress::new(1, 2)), Some("×"));
}

#[test]
fn cancel_leaves_the_mark_alone() {
    let mut desk = Desk::new(sheet(), Settings::default().symbols);
    let mut view = SheetView::new();
    view.pointer_down(1, 1, desk.sheet.grid(), &mut desk);
    view.pointer_cancel(&mut desk);
    assert_eq!(desk.sheet.mark(CellAddress::new(0, 0)), None);
    assert!(!desk.dirty);
    assert!(desk.status.contains("click a cell"));
}

#[test]
fn scrolling_moves_the_headers() {
    let mut desk = Desk::new(sheet(), Settings::default().symbols);
    let mut view = SheetView::new();
    let content = desk.sheet.grid().content_size();
    assert_eq!(content, (43, 13));
    view.resize(20, 8, content);
    view.scroll_by(6, 6, content, &mut desk);
    assert_eq!(desk.header_scroll, (6, 5));
}

#[test]
fn sheet_survives_a_save_and_load() {
    let dir = temp_dir("roundtrip");
    let path = dir.join("sheet.json");
    let mut s = sheet();
    s.entries[0].attends[3] = Some("△".to_string());
    save_atomic(&path, &s).unwrap();
    assert_eq!(load_sheet(&path).unwrap(), Some(s));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_file_is_not_an_error() {
    let dir = temp_dir("missing");
    assert_eq!(load_sheet(&dir.join("nope.json")).unwrap(), None);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn ragged_file_is_refused() {
    let dir = temp_dir("ragged");
    let path = dir.join("sheet.json");
    let mut s = sheet();
    s.entries[1].attends.push(None);
    fs::write(&path, serde_json::to_string(&s).unwrap()).unwrap();
    assert!(matches!(load_sheet(&path), Err(SheetError::Ragged { row: 1, .. })));

    fs::write(&path, "[1, 2").unwrap();
    assert!(matches!(load_sheet(&path), Err(SheetError::Json { .. })));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn new_sheet_uses_cli_names_and_dates() {
    let dir = temp_dir("create");
    let s = open_or_create(&args(), &Settings::default(), &dir.join("sheet.json")).unwrap();
    assert_eq!(s.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), ["Aoi", "Ren"]);
    assert_eq!(s.dates.len(), 3);
    assert_eq!(s.grid(), Grid::new(Settings::default().cell_size, 2, 3));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn non_positive_cell_size_is_rejected() {
    let dir = temp_dir("cellsize");
    let mut a = args();
    a.cell_size = Some(0);
    assert!(open_or_create(&a, &Settings::default(), &dir.join("sheet.json")).is_err());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn dates_past_the_calendar_end_are_an_error() {
    let dir = temp_dir("daterange");
    let mut a = args();
    a.start = NaiveDate::MAX.pred_opt();
    let err = open_or_create(&a, &Settings::default(), &dir.join("sheet.json")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SheetError>(),
        Some(SheetError::DateRange { days: 3, .. })
    ));
    assert!(!dir.join("sheet.json").exists());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn only_dirty_sheets_are_written() {
    let dir = temp_dir("dirty");
    let path = dir.join("sheet.json");
    let mut desk = Desk::new(sheet(), Settings::default().symbols);
    assert!(!save_if_dirty(&path, &mut desk).unwrap());
    assert!(!path.exists());

    let mut view = SheetView::new();
    view.pointer_down(1, 1, desk.sheet.grid(), &mut desk);
    view.pointer_up(&mut desk);
    assert!(save_if_dirty(&path, &mut desk).unwrap());
    assert!(!desk.dirty);
    let back = load_sheet(&path).unwrap().unwrap();
    assert_eq!(back.mark(CellAddress::new(0, 0)), Some("○"));
    fs::remove_dir_all(&dir).ok();
}

/// 40×12 terminal: the sheet area starts at column 4, row 3 and shows 36×16 pixels.
fn screen() -> (SheetView, Desk, Layout) {
    let desk = Desk::new(sheet(), Settings::default().symbols);
    let layout = Layout::compute(40, 12, &desk.sheet);
    let mut view = SheetView::new();
    let (w, h) = layout.viewport_size();
    view.resize(w, h, desk.sheet.grid().content_size());
    (view, desk, layout)
}

#[test]
fn drag_cancels_the_press_and_scrolls() {
    let (mut view, mut desk, layout) = screen();
    let mut drag = None;
    let down = SheetAction::PointerDown { col: 5, row: 3 };
    assert!(!apply_action(&mut view, &mut desk, &layout, &mut drag, down));
    assert_eq!(view.focus(), Some(CellAddress::new(0, 0)));

    let step = SheetAction::Drag { col: 3, row: 3 };
    apply_action(&mut view, &mut desk, &layout, &mut drag, step);
    assert_eq!(view.focus(), None);
    assert!(!view.is_pressed());
    assert_eq!(view.viewport().scroll_x, 2);
    assert_eq!(desk.header_scroll, (2, 0));
    assert_eq!(drag, Some((3, 3)));

    apply_action(&mut view, &mut desk, &layout, &mut drag, SheetAction::PointerUp);
    assert!(!desk.dirty);
    assert_eq!(drag, None);
}

#[test]
fn escape_after_a_click_clears_the_highlight() {
    let (mut view, mut desk, layout) = screen();
    let mut drag = None;
    let down = SheetAction::PointerDown { col: 5, row: 3 };
    apply_action(&mut view, &mut desk, &layout, &mut drag, down);
    apply_action(&mut view, &mut desk, &layout, &mut drag, SheetAction::PointerUp);
    assert_eq!(view.focus(), Some(CellAddress::new(0, 0)));
    assert!(desk.status.starts_with("Aoi @ 2024-04-01"));

    apply_action(&mut view, &mut desk, &layout, &mut drag, SheetAction::Cancel);
    assert_eq!(view.focus(), None);
    assert!(desk.status.contains("click a cell"));
    assert_eq!(desk.sheet.mark(CellAddress::new(0, 0)), Some("○"));
}

#[test]
fn presses_off_the_sheet_do_nothing() {
    let (mut view, mut desk, layout) = screen();
    let mut drag = None;
    let before = desk.status.clone();

    // title row, then below the last member
    for (col, row) in [(0, 0), (5, 10)] {
        let down = SheetAction::PointerDown { col, row };
        apply_action(&mut view, &mut desk, &layout, &mut drag, down);
        assert_eq!(view.focus(), None);
        assert!(!view.is_pressed());
        apply_action(&mut view, &mut desk, &layout, &mut drag, SheetAction::PointerUp);
    }
    assert_eq!(desk.status, before);
    assert!(!desk.dirty);
    assert!(apply_action(&mut view, &mut desk, &layout, &mut drag, SheetAction::Quit));
}
