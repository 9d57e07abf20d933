use serde::{Deserialize, Serialize};

/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Movement category used to decide which turns are legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn axis(&self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// Returns true if turning from `current` to self is allowed.
    ///
    /// Only perpendicular turns are legal; a snake that has not moved yet
    /// (`None`) accepts any direction.
    pub fn can_follow(&self, current: Option<Direction>) -> bool {
        match current {
            Some(current) => current.axis() != self.axis(),
            None => true,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns the displacement (dx, dy) for one step on a grid with the given unit
    pub fn delta(&self, unit: i32) -> (i32, i32) {
        match self {
            Direction::Up => (0, -unit),
            Direction::Down => (0, unit),
            Direction::Left => (-unit, 0),
            Direction::Right => (unit, 0),
        }
    }
}

/// Command delivered to the engine by an input surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    Restart,
    SetSpeed(u8),
    SpeedUp,
    SlowDown,
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        Command::Turn(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis() {
        assert_eq!(Direction::Up.axis(), Axis::Vertical);
        assert_eq!(Direction::Down.axis(), Axis::Vertical);
        assert_eq!(Direction::Left.axis(), Axis::Horizontal);
        assert_eq!(Direction::Right.axis(), Axis::Horizontal);
    }

    #[test]
    fn test_same_axis_rejected() {
        let moving_right = Some(Direction::Right);
        assert!(!Direction::Left.can_follow(moving_right));
        assert!(!Direction::Right.can_follow(moving_right));
        assert!(Direction::Up.can_follow(moving_right));
        assert!(Direction::Down.can_follow(moving_right));
    }

    #[test]
    fn test_any_first_direction_accepted() {
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert!(dir.can_follow(None));
        }
    }

    #[test]
    fn test_opposite() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.opposite().axis(), dir.axis());
        }
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(20), (0, -20));
        assert_eq!(Direction::Down.delta(20), (0, 20));
        assert_eq!(Direction::Left.delta(20), (-20, 0));
        assert_eq!(Direction::Right.delta(20), (20, 0));
    }
}
