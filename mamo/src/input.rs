use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

/// Acceleration sample fed to the shell when the player presses the shake key.
pub const SHAKE_SAMPLE: [f32; 3] = [12.0, 9.0, 18.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scene {
    Play,
    About,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameAction {
    Tap { col: u16, row: u16 },
    Bomb,
    ToggleSound,
    Shake,
    About,
    SimpleMode,
    Back,
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

/// Simple mode hides the HUD, so only taps, shakes and quitting remain.
pub fn map_event_to_action(scene: Scene, simple: bool, ev: &Event) -> Option<GameAction> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
                return Some(GameAction::Quit);
            }
            if scene == Scene::About {
                return Some(GameAction::Back);
            }
            match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(GameAction::Quit),
                KeyCode::Char('n') | KeyCode::Char('N') => Some(GameAction::Shake),
                KeyCode::Char('b') | KeyCode::Char('B') if !simple => Some(GameAction::Bomb),
                KeyCode::Char('s') | KeyCode::Char('S') if !simple => Some(GameAction::ToggleSound),
                KeyCode::Char('a') | KeyCode::Char('A') if !simple => Some(GameAction::About),
                KeyCode::Char('z') | KeyCode::Char('Z') if !simple => Some(GameAction::SimpleMode),
                _ => None,
            }
        }
        Event::Mouse(m) => map_mouse(scene, m),
        _ => None,
    }
}

fn map_mouse(scene: Scene, m: &MouseEvent) -> Option<GameAction> {
    match (scene, m.kind) {
        (Scene::Play, MouseEventKind::Down(MouseButton::Left)) => Some(GameAction::Tap {
            col: m.column,
            row: m.row,
        }),
        (Scene::About, MouseEventKind::Down(_)) => Some(GameAction::Back),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::SHAKE_THRESHOLD;
    use crossterm::event::{KeyEvent, KeyEventState};
    use test_case::test_case;

    fn key(c: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code: c,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 12,
            row: 5,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test_case('b', Some(GameAction::Bomb) ; "bomb")]
    #[test_case('s', Some(GameAction::ToggleSound) ; "sound")]
    #[test_case('n', Some(GameAction::Shake) ; "shake")]
    #[test_case('a', Some(GameAction::About) ; "about")]
    #[test_case('z', Some(GameAction::SimpleMode) ; "simple")]
    #[test_case('q', Some(GameAction::Quit) ; "quit")]
    #[test_case('x', None ; "unbound")]
    fn play_keys(c: char, want: Option<GameAction>) {
        assert_eq!(map_event_to_action(Scene::Play, false, &key(KeyCode::Char(c))), want);
    }

    #[test]
    fn simple_mode_drops_menu_keys() {
        for c in ['b', 's', 'a', 'z'] {
            assert_eq!(map_event_to_action(Scene::Play, true, &key(KeyCode::Char(c))), None);
        }
        assert_eq!(
            map_event_to_action(Scene::Play, true, &key(KeyCode::Char('n'))),
            Some(GameAction::Shake)
        );
        assert_eq!(
            map_event_to_action(Scene::Play, true, &key(KeyCode::Esc)),
            Some(GameAction::Quit)
        );
    }

    #[test]
    fn left_press_taps_and_about_closes_on_anything() {
        let down = click(MouseEventKind::Down(MouseButton::Left));
        assert_eq!(
            map_event_to_action(Scene::Play, true, &down),
            Some(GameAction::Tap { col: 12, row: 5 })
        );
        assert_eq!(map_event_to_action(Scene::Play, false, &click(MouseEventKind::Moved)), None);
        assert_eq!(map_event_to_action(Scene::About, false, &down), Some(GameAction::Back));
        assert_eq!(
            map_event_to_action(Scene::About, false, &key(KeyCode::Char('q'))),
            Some(GameAction::Back)
        );
    }

    #[test]
    fn shake_sample_clears_threshold() {
        let r: f32 = SHAKE_SAMPLE.iter().map(|v| v * v).sum();
        assert!(r > SHAKE_THRESHOLD);
    }
}
