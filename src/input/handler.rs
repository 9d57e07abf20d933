use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::game::{Command, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    Quit,
    None,
}

/// Translates terminal key and mouse events into engine commands.
///
/// A left-button press followed by a release is treated as a swipe; the
/// dominant axis of the drag picks the direction.
pub struct InputHandler {
    swipe_threshold: i32,
    swipe_start: Option<(u16, u16)>,
}

impl InputHandler {
    pub fn new(swipe_threshold: u16) -> Self {
        Self {
            swipe_threshold: i32::from(swipe_threshold),
            swipe_start: None,
        }
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => turn(Direction::Up),
            KeyCode::Down => turn(Direction::Down),
            KeyCode::Left => turn(Direction::Left),
            KeyCode::Right => turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => turn(Direction::Right),

            // Speed
            KeyCode::Char('0') => KeyAction::Command(Command::SetSpeed(10)),
            KeyCode::Char(c @ '1'..='9') => {
                KeyAction::Command(Command::SetSpeed(c as u8 - b'0'))
            }
            KeyCode::Char('+') | KeyCode::Char('=') => KeyAction::Command(Command::SpeedUp),
            KeyCode::Char('-') => KeyAction::Command(Command::SlowDown),

            // Controls
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                KeyAction::Command(Command::TogglePause)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Command(Command::Restart),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> KeyAction {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.swipe_start = Some((mouse.column, mouse.row));
                KeyAction::None
            }
            MouseEventKind::Up(MouseButton::Left) => match self.swipe_start.take() {
                Some(start) => self.classify_swipe(start, (mouse.column, mouse.row)),
                None => KeyAction::None,
            },
            _ => KeyAction::None,
        }
    }

    fn classify_swipe(&self, start: (u16, u16), end: (u16, u16)) -> KeyAction {
        // Grid cells are drawn two columns wide
        let dx = (i32::from(end.0) - i32::from(start.0)) / 2;
        let dy = i32::from(end.1) - i32::from(start.1);

        if dx.abs() > dy.abs() {
            if dx > self.swipe_threshold {
                return turn(Direction::Right);
            } else if dx < -self.swipe_threshold {
                return turn(Direction::Left);
            }
        } else if dy > self.swipe_threshold {
            return turn(Direction::Down);
        } else if dy < -self.swipe_threshold {
            return turn(Direction::Up);
        }

        KeyAction::None
    }
}

fn turn(direction: Direction) -> KeyAction {
    KeyAction::Command(Command::Turn(direction))
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(3)
    }
}
