use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionType, GameState, Position, Snake},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step (for RL training)
    pub reward: f32,
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic
///
/// Food placement draws from a seeded generator so that a fixed seed
/// reproduces the full episode sequence.
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration and RNG seed
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let food = self.spawn_food_avoid_snake(&snake);

        GameState::new(snake, food, self.config.grid_width, self.config.grid_height)
    }

    /// Execute one step of the game
    ///
    /// The direction is applied unconditionally, the snake advances one cell,
    /// and the reward is assigned with strict priority: collision, then food,
    /// then distance shaping against the pre-move head-to-food distance.
    pub fn step(&mut self, state: &mut GameState, direction: Direction) -> StepResult {
        if !state.is_alive {
            return StepResult {
                reward: 0.0,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: None,
                },
            };
        }

        state.snake.direction = direction;

        let old_distance = state.head_to_food_distance();

        state.snake.advance();
        state.steps += 1;

        // Collision takes priority over everything else
        if let Some(collision_type) = self.check_collision(state) {
            state.is_alive = false;

            return StepResult {
                reward: self.config.death_penalty,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: Some(collision_type),
                },
            };
        }

        // Then food
        if state.snake.head() == state.food {
            state.score += 1;
            state.snake.grow_snake();
            state.food = self.spawn_food_avoid_snake(&state.snake);

            return StepResult {
                reward: self.config.food_reward,
                terminated: false,
                info: StepInfo {
                    ate_food: true,
                    collision_type: None,
                },
            };
        }

        // Otherwise shape by whether the move closed the distance to the food
        let new_distance = state.head_to_food_distance();
        let reward = if new_distance < old_distance {
            self.config.approach_reward
        } else {
            self.config.retreat_penalty
        };

        StepResult {
            reward,
            terminated: false,
            info: StepInfo {
                ate_food: false,
                collision_type: None,
            },
        }
    }

    /// Check whether the snake's head, after moving, sits out of bounds or on
    /// its own body
    fn check_collision(&self, state: &GameState) -> Option<CollisionType> {
        let head = state.snake.head();

        if !state.is_in_bounds(head) {
            return Some(CollisionType::Wall);
        }

        if state.snake.collides_with_body(head) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Spawn food at a random cell not occupied by the snake
    fn spawn_food_avoid_snake(&mut self, snake: &Snake) -> Position {
        loop {
            let x = self.rng.gen_range(0..self.config.grid_width) as i32;
            let y = self.rng.gen_range(0..self.config.grid_height) as i32;
            let pos = Position::new(x, y);

            if !snake.body.contains(&pos) {
                return pos;
            }
        }
    }
}
