use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

/// Everything the sheet reacts to, already stripped of terminal details.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetAction {
    PointerDown { col: u16, row: u16 },
    PointerUp,
    /// Left-button drag: the scroll container takes the gesture over.
    Drag { col: u16, row: u16 },
    Cancel,
    ScrollCells { dx: i32, dy: i32 },
    ScrollPage { dy: i32 },
    Home,
    Quit,
}

pub fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<Event>> {
    let mut out = Vec::new();
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        out.push(event::read()?);
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

pub fn map_event(ev: &Event) -> Option<SheetAction> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
            let fast = k.modifiers.contains(KeyModifiers::SHIFT);
            let step = if fast { 4 } else { 1 };
            match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => Some(SheetAction::Quit),
                KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(SheetAction::Quit)
                }
                KeyCode::Esc => Some(SheetAction::Cancel),
                KeyCode::Left => Some(SheetAction::ScrollCells { dx: -step, dy: 0 }),
                KeyCode::Right => Some(SheetAction::ScrollCells { dx: step, dy: 0 }),
                KeyCode::Up => Some(SheetAction::ScrollCells { dx: 0, dy: -step }),
                KeyCode::Down => Some(SheetAction::ScrollCells { dx: 0, dy: step }),
                KeyCode::PageUp => Some(SheetAction::ScrollPage { dy: -1 }),
                KeyCode::PageDown => Some(SheetAction::ScrollPage { dy: 1 }),
                KeyCode::Home => Some(SheetAction::Home),
                _ => None,
            }
        }
        Event::Mouse(m) => map_mouse(m),
        _ => None,
    }
}

fn map_mouse(m: &MouseEvent) -> Option<SheetAction> {
    let (col, row) = (m.column, m.row);
    let horizontal = m.modifiers.contains(KeyModifiers::SHIFT);
    match m.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(SheetAction::PointerDown { col, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(SheetAction::PointerUp),
        MouseEventKind::Drag(MouseButton::Left) => Some(SheetAction::Drag { col, row }),
        MouseEventKind::Down(MouseButton::Right) => Some(SheetAction::Cancel),
        MouseEventKind::ScrollDown if horizontal => Some(SheetAction::ScrollCells { dx: 1, dy: 0 }),
        MouseEventKind::ScrollUp if horizontal => Some(SheetAction::ScrollCells { dx: -1, dy: 0 }),
        MouseEventKind::ScrollDown => Some(SheetAction::ScrollCells { dx: 0, dy: 1 }),
        MouseEventKind::ScrollUp => Some(SheetAction::ScrollCells { dx: 0, dy: -1 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyEventState};

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 9,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn left_button_drives_the_pointer() {
        assert_eq!(
            map_event(&mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(SheetAction::PointerDown { col: 9, row: 4 })
        );
        assert_eq!(
            map_event(&mouse(MouseEventKind::Up(MouseButton::Left))),
            Some(SheetAction::PointerUp)
        );
        assert_eq!(
            map_event(&mouse(MouseEventKind::Drag(MouseButton::Left))),
            Some(SheetAction::Drag { col: 9, row: 4 })
        );
        assert_eq!(map_event(&mouse(MouseEventKind::Moved)), None);
    }

    #[test]
    fn escape_cancels_and_shift_speeds_scrolling() {
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(map_event(&esc), Some(SheetAction::Cancel));
        let right = Event::Key(KeyEvent {
            code: KeyCode::Right,
            modifiers: KeyModifiers::SHIFT,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert_eq!(map_event(&right), Some(SheetAction::ScrollCells { dx: 4, dy: 0 }));
    }
}
