/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Number of discrete movement actions available to the agent
    pub const COUNT: usize = 4;

    /// Map an agent action index to a direction
    ///
    /// - 0 → Up
    /// - 1 → Down
    /// - 2 → Left
    /// - 3 → Right
    /// - other → Right (default)
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Direction::Up,
            1 => Direction::Down,
            2 => Direction::Left,
            3 => Direction::Right,
            _ => Direction::Right, // Default for invalid indices
        }
    }

    /// Returns the delta (dx, dy) for moving in this direction
    ///
    /// The y axis grows downward, so Up is (0, -1).
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_index_mapping() {
        assert_eq!(Direction::from_index(0), Direction::Up);
        assert_eq!(Direction::from_index(1), Direction::Down);
        assert_eq!(Direction::from_index(2), Direction::Left);
        assert_eq!(Direction::from_index(3), Direction::Right);
        assert_eq!(Direction::from_index(999), Direction::Right); // Invalid → Right
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (0, 1));
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (1, 0));
    }

    #[test]
    fn test_action_count_covers_all_directions() {
        let directions: Vec<Direction> = (0..Direction::COUNT).map(Direction::from_index).collect();
        assert_eq!(
            directions,
            vec![
                Direction::Up,
                Direction::Down,
                Direction::Left,
                Direction::Right
            ]
        );
    }
}
