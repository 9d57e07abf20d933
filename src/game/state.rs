use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A cell on the playing field, in field units (multiples of the grid unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one grid unit in a direction
    pub fn moved_in_direction(&self, direction: Direction, unit: i32) -> Self {
        let (dx, dy) = direction.delta(unit);
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    /// Body segments, with head at index 0; never empty
    pub body: Vec<Position>,
}

impl Snake {
    /// Create a single-cell snake
    pub fn new(head: Position) -> Self {
        Self { body: vec![head] }
    }

    /// Create a snake from explicit segments, head first
    pub fn from_segments(body: Vec<Position>) -> Option<Self> {
        if body.is_empty() {
            None
        } else {
            Some(Self { body })
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Check whether `pos` hits a segment still present after this tick.
    ///
    /// The tail moves away on a tick where nothing is eaten, so it only
    /// counts when the snake is growing.
    pub fn collides_after_move(&self, pos: Position, growing: bool) -> bool {
        let remaining = if growing {
            &self.body[..]
        } else {
            &self.body[..self.body.len() - 1]
        };
        remaining.contains(&pos)
    }

    /// Push a new head, dropping the tail unless growing
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Coarse lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first direction
    Idle,
    Running,
    Paused,
    /// Round finished; only a restart is accepted
    Over,
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Why a round reached `GamePhase::Over`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Collision(CollisionType),
    /// No free cell was left for the next food
    BoardFilled,
}

/// State of one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub snake: Snake,
    /// `None` until the first direction is accepted
    pub direction: Option<Direction>,
    /// Direction of the most recent completed move
    pub last_moved: Option<Direction>,
    pub food: Position,
    pub score: u32,
    pub steps: u32,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
}

impl GameState {
    /// Create a fresh idle round
    pub fn new(snake: Snake, food: Position) -> Self {
        Self {
            snake,
            direction: None,
            last_moved: None,
            food,
            score: 0,
            steps: 0,
            phase: GamePhase::Idle,
            end_reason: None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake_of(cells: &[(i32, i32)]) -> Snake {
        Snake::from_segments(cells.iter().map(|&(x, y)| Position::new(x, y)).collect()).unwrap()
    }

    #[test]
    fn test_position_movement() {
        let pos = Position::new(100, 100);
        assert_eq!(pos.moved_in_direction(Direction::Right, 20), Position::new(120, 100));
        assert_eq!(pos.moved_in_direction(Direction::Left, 20), Position::new(80, 100));
        assert_eq!(pos.moved_in_direction(Direction::Down, 20), Position::new(100, 120));
        assert_eq!(pos.moved_in_direction(Direction::Up, 20), Position::new(100, 80));
    }

    #[test]
    fn test_empty_snake_rejected() {
        assert!(Snake::from_segments(Vec::new()).is_none());
    }

    #[test]
    fn test_snake_advance() {
        let mut snake = snake_of(&[(100, 100), (80, 100)]);

        snake.advance(Position::new(120, 100), false);
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.head(), Position::new(120, 100));
        assert_eq!(snake.tail(), Position::new(100, 100));

        snake.advance(Position::new(140, 100), true);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.tail(), Position::new(100, 100));
    }

    #[test]
    fn test_single_cell_advance_keeps_length() {
        let mut snake = Snake::new(Position::new(200, 200));
        snake.advance(Position::new(220, 200), false);
        assert_eq!(snake.body, vec![Position::new(220, 200)]);
    }

    #[test]
    fn test_tail_excluded_unless_growing() {
        // A 2x2 loop: head can step onto the cell the tail is leaving
        let snake = snake_of(&[(20, 0), (20, 20), (0, 20), (0, 0)]);
        let tail = Position::new(0, 0);

        assert!(!snake.collides_after_move(tail, false));
        assert!(snake.collides_after_move(tail, true));
        assert!(snake.collides_after_move(Position::new(20, 20), false));
        assert!(!snake.collides_after_move(Position::new(40, 0), true));
    }
}
