//! Compact feature encoding of the game state
//!
//! Encodes the geometry the agent needs into a 12-element binary vector:
//! travel direction, where the food sits relative to the head, and which of
//! the four candidate moves is immediately fatal. This is far smaller than a
//! full grid observation and is what the Q-network consumes.

use crate::game::GameState;

/// Number of features produced by [`encode_state`]
pub const STATE_SIZE: usize = 12;

/// Encode a game state as a fixed-size feature vector
///
/// Layout (every element is 0.0 or 1.0):
/// - `[0..4]` current travel direction one-hot: right, left, up, down.
///   Derived from the first two body segments; a snake shorter than two
///   segments is treated as moving right.
/// - `[4..8]` food position relative to the head: left, right, above, below.
///   Independent flags; both axes can be set at once.
/// - `[8..12]` danger flags for the candidate moves right, left, up, down:
///   set when the resulting head cell would leave the board or land on the
///   body, excluding the tail cell since it vacates on a non-growing move.
///
/// Deterministic and side-effect free.
pub fn encode_state(state: &GameState) -> [f32; STATE_SIZE] {
    let mut features = [0.0; STATE_SIZE];
    let head = state.snake.head();

    // Travel direction from head and neck segments
    let (dx, dy) = if state.snake.len() >= 2 {
        let neck = state.snake.body[1];
        (head.x - neck.x, head.y - neck.y)
    } else {
        (1, 0)
    };
    features[0] = flag(dx == 1 && dy == 0); // right
    features[1] = flag(dx == -1 && dy == 0); // left
    features[2] = flag(dx == 0 && dy == -1); // up
    features[3] = flag(dx == 0 && dy == 1); // down

    // Food location relative to the head
    features[4] = flag(state.food.x < head.x); // left of head
    features[5] = flag(state.food.x > head.x); // right of head
    features[6] = flag(state.food.y < head.y); // above head
    features[7] = flag(state.food.y > head.y); // below head

    // Danger per candidate move: right, left, up, down
    for (i, (dx, dy)) in [(1, 0), (-1, 0), (0, -1), (0, 1)].into_iter().enumerate() {
        let cell = head.moved_by(dx, dy);

        // The tail is not treated as blocking: it vacates on the next
        // non-growing move. While growth is pending this under-reports the
        // hazard for one tick.
        let blocking = &state.snake.body[..state.snake.len() - 1];

        let danger = !state.is_in_bounds(cell) || blocking.contains(&cell);
        features[8 + i] = flag(danger);
    }

    features
}

fn flag(condition: bool) -> f32 {
    if condition {
        1.0
    } else {
        0.0
    }
}
