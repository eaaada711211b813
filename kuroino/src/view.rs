//! Pointer handling and scroll state of the sheet.
//!
//! All calls happen on the UI loop thread and run to completion; observer
//! callbacks are invoked synchronously from inside the pointer handlers.

use crate::mapper::{CellAddress, Grid, Viewport};

/// Receiver of sheet interaction events.
pub trait FocusObserver {
    /// A new cell gained focus, or `None` when focus was cancelled.
    fn focus_changed(&mut self, focus: Option<CellAddress>);

    /// The pointer was released over the focused cell.
    fn cell_committed(&mut self, addr: CellAddress);

    fn scroll_changed(&mut self, _x: i32, _y: i32) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerState {
    Idle,
    Focused(CellAddress),
}

#[derive(Clone, Debug, Default)]
pub struct SheetView {
    focus: Option<CellAddress>,
    pressed: bool,
    viewport: Viewport,
}

impl SheetView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Option<CellAddress> {
        self.focus
    }

    /// True between an accepted pointer-down and the matching up/cancel.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn state(&self) -> PointerState {
        match (self.pressed, self.focus) {
            (true, Some(a)) => PointerState::Focused(a),
            _ => PointerState::Idle,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Accepts the press only when it lands on a cell; anything else is ignored.
    pub fn pointer_down(
        &mut self,
        x: i32,
        y: i32,
        grid: Grid,
        observer: &mut dyn FocusObserver,
    ) -> bool {
        let Some(addr) = grid.cell_at(x, y) else {
            return false;
        };
        self.pressed = true;
        self.focus = Some(addr);
        log::debug!("focus -> ({}, {})", addr.row, addr.col);
        observer.focus_changed(Some(addr));
        true
    }

    /// Commits the focused cell. Focus stays set so the committed cell remains
    /// highlighted until the next press or an explicit clear.
    pub fn pointer_up(&mut self, observer: &mut dyn FocusObserver) -> bool {
        if !self.pressed {
            return false;
        }
        self.pressed = false;
        match self.focus {
            Some(addr) => {
                observer.cell_committed(addr);
                true
            }
            None => false,
        }
    }

    pub fn pointer_cancel(&mut self, observer: &mut dyn FocusObserver) -> bool {
        if !self.pressed {
            return false;
        }
        self.pressed = false;
        self.focus = None;
        log::debug!("focus cancelled");
        observer.focus_changed(None);
        true
    }

    /// External focus set/clear; observers are not notified.
    pub fn set_focus(&mut self, focus: Option<CellAddress>) {
        self.focus = focus;
    }

    /// Resize the visible area and re-clamp the scroll offset.
    pub fn resize(&mut self, width: i32, height: i32, content: (i32, i32)) {
        self.viewport.width = width.max(0);
        self.viewport.height = height.max(0);
        let vp = self.viewport;
        let (x, y) = clamp_scroll(vp, content, vp.scroll_x, vp.scroll_y);
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
    }

    /// Moves the viewport, clamped to `[0, content - viewport]`. The observer
    /// hears about it only if the offset actually changed.
    pub fn scroll_to(
        &mut self,
        x: i32,
        y: i32,
        content: (i32, i32),
        observer: &mut dyn FocusObserver,
    ) -> bool {
        let (x, y) = clamp_scroll(self.viewport, content, x, y);
        if x == self.viewport.scroll_x && y == self.viewport.scroll_y {
            return false;
        }
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
        observer.scroll_changed(x, y);
        true
    }

    pub fn scroll_by(
        &mut self,
        dx: i32,
        dy: i32,
        content: (i32, i32),
        observer: &mut dyn FocusObserver,
    ) -> bool {
        let x = self.viewport.scroll_x.saturating_add(dx);
        let y = self.viewport.scroll_y.saturating_add(dy);
        self.scroll_to(x, y, content, observer)
    }
}

fn clamp_scroll(vp: Viewport, content: (i32, i32), x: i32, y: i32) -> (i32, i32) {
    let max_x = (content.0 - vp.width).max(0);
    let max_y = (content.1 - vp.height).max(0);
    (x.clamp(0, max_x), y.clamp(0, max_y))
}
