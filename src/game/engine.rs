use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::watch;

use super::{
    action::{Command, Direction},
    config::{GameConfig, SpeedLevel},
    state::{CollisionType, EndReason, GamePhase, GameState, Position, Snake},
    storage::HighScoreStore,
    timer::{Tick, TickScheduler},
};

/// Points awarded per food eaten
pub const FOOD_SCORE: u32 = 10;

/// Random samples tried before falling back to enumerating free cells
const FOOD_SAMPLE_ATTEMPTS: usize = 64;

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The engine was not running or the tick was stale; nothing changed
    Skipped,
    Moved,
    Ate { new_high_score: bool },
    Collided(CollisionType),
    /// The snake ate the last free cell's food and the round ended
    BoardFilled,
}

/// Everything the presentation layer needs after a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub state: GameState,
    pub high_score: u32,
    pub speed: SpeedLevel,
    pub interval: Duration,
    pub grid_width: usize,
    pub grid_height: usize,
    pub grid_unit: i32,
}

impl GameSnapshot {
    /// Grid column and row of a field position
    pub fn cell_of(&self, pos: Position) -> (usize, usize) {
        ((pos.x / self.grid_unit) as usize, (pos.y / self.grid_unit) as usize)
    }
}

/// The game engine: owns the round state and drives it through its phases
pub struct GameEngine<S, T> {
    config: GameConfig,
    state: GameState,
    speed: SpeedLevel,
    high_score: u32,
    rng: StdRng,
    store: S,
    scheduler: T,
    notifier: watch::Sender<GameSnapshot>,
}

impl<S: HighScoreStore, T: TickScheduler> GameEngine<S, T> {
    /// Create a new engine with food placement seeded from entropy
    pub fn new(config: GameConfig, store: S, scheduler: T) -> Result<Self> {
        Self::build(config, store, scheduler, StdRng::from_entropy())
    }

    /// Create a new engine with deterministic food placement
    pub fn with_seed(config: GameConfig, store: S, scheduler: T, seed: u64) -> Result<Self> {
        Self::build(config, store, scheduler, StdRng::seed_from_u64(seed))
    }

    fn build(config: GameConfig, store: S, scheduler: T, rng: StdRng) -> Result<Self> {
        config.validate()?;

        let high_score = match store.load() {
            Ok(score) => score.unwrap_or(0),
            Err(err) => {
                tracing::warn!("failed to load high score, starting from 0: {:#}", err);
                0
            }
        };

        let start = config.start_position();
        let state = GameState::new(Snake::new(start), start);
        let speed = config.speed_level;
        let (notifier, _) = watch::channel(GameSnapshot {
            state: state.clone(),
            high_score,
            speed,
            interval: speed.interval(),
            grid_width: config.grid_width,
            grid_height: config.grid_height,
            grid_unit: config.grid_unit,
        });

        let mut engine = Self {
            config,
            state,
            speed,
            high_score,
            rng,
            store,
            scheduler,
            notifier,
        };
        engine.initialize();
        Ok(engine)
    }

    /// Reset the round: single-cell snake at the start cell, no direction,
    /// zero score, fresh food, phase `Idle`
    pub fn initialize(&mut self) {
        let snake = Snake::new(self.config.start_position());
        // A validated grid always has a free cell next to a single-cell snake
        let food = place_food(&mut self.rng, &self.config, &snake).unwrap_or_else(|| snake.head());

        self.state = GameState::new(snake, food);
        tracing::debug!(?food, "round initialized");
        self.publish();
    }

    /// Request a new direction; returns whether it was accepted.
    ///
    /// Turns along the axis of the current direction are rejected, as is the
    /// reverse of the last move actually made, so two inputs within one tick
    /// can never fold the snake back onto its neck. The first accepted
    /// direction starts the round.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.state.phase == GamePhase::Over {
            return false;
        }

        if !direction.can_follow(self.state.direction) {
            return false;
        }
        if self.state.last_moved.map(|moved| moved.opposite()) == Some(direction) {
            return false;
        }

        self.state.direction = Some(direction);

        if self.state.phase == GamePhase::Idle {
            self.state.phase = GamePhase::Running;
            self.scheduler.arm(self.speed.interval());
            tracing::debug!(?direction, interval = ?self.speed.interval(), "round started");
        }

        self.publish();
        true
    }

    /// Advance the round by one tick
    pub fn step(&mut self) -> StepOutcome {
        if self.state.phase != GamePhase::Running {
            return StepOutcome::Skipped;
        }
        let Some(direction) = self.state.direction else {
            return StepOutcome::Skipped;
        };

        let new_head = self
            .state
            .snake
            .head()
            .moved_in_direction(direction, self.config.grid_unit);
        let eating = new_head == self.state.food;

        if let Some(collision) = self.check_collision(new_head, eating) {
            self.end_round(EndReason::Collision(collision));
            return StepOutcome::Collided(collision);
        }

        self.state.snake.advance(new_head, eating);
        self.state.last_moved = Some(direction);
        self.state.steps += 1;

        if !eating {
            self.publish();
            return StepOutcome::Moved;
        }

        self.state.score += FOOD_SCORE;
        let new_high_score = self.record_score();

        match place_food(&mut self.rng, &self.config, &self.state.snake) {
            Some(food) => {
                self.state.food = food;
                self.publish();
                StepOutcome::Ate { new_high_score }
            }
            None => {
                self.end_round(EndReason::BoardFilled);
                StepOutcome::BoardFilled
            }
        }
    }

    /// Step in response to a scheduler tick, dropping ticks from cancelled tasks
    pub fn on_tick(&mut self, tick: Tick) -> StepOutcome {
        if !self.scheduler.is_current(tick) {
            tracing::trace!(generation = tick.generation, "dropping stale tick");
            return StepOutcome::Skipped;
        }
        self.step()
    }

    /// Change the speed level, clamping to the valid range.
    ///
    /// A running round is re-armed immediately; the next tick comes one full
    /// new interval later.
    pub fn set_speed_level(&mut self, level: u8) {
        self.speed = SpeedLevel::new(level);

        if self.state.phase == GamePhase::Running {
            self.scheduler.arm(self.speed.interval());
        }

        tracing::debug!(level = self.speed.get(), interval = ?self.speed.interval(), "speed changed");
        self.publish();
    }

    /// Toggle between `Running` and `Paused`; ignored in any other phase
    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            GamePhase::Running => {
                self.scheduler.disarm();
                self.state.phase = GamePhase::Paused;
            }
            GamePhase::Paused => {
                self.scheduler.arm(self.speed.interval());
                self.state.phase = GamePhase::Running;
            }
            GamePhase::Idle | GamePhase::Over => return,
        }

        tracing::debug!(phase = ?self.state.phase, "pause toggled");
        self.publish();
    }

    /// Cancel any pending tick and start a fresh round
    pub fn restart(&mut self) {
        self.scheduler.disarm();
        self.initialize();
    }

    /// Dispatch a command from an input surface
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Turn(direction) => {
                self.set_direction(direction);
            }
            Command::TogglePause => self.toggle_pause(),
            Command::Restart => self.restart(),
            Command::SetSpeed(level) => self.set_speed_level(level),
            Command::SpeedUp => self.set_speed_level(self.speed.faster().get()),
            Command::SlowDown => self.set_speed_level(self.speed.slower().get()),
        }
    }

    /// Receiver notified after every state mutation
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.notifier.subscribe()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state.clone(),
            high_score: self.high_score,
            speed: self.speed,
            interval: self.speed.interval(),
            grid_width: self.config.grid_width,
            grid_height: self.config.grid_height,
            grid_unit: self.config.grid_unit,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn speed_level(&self) -> SpeedLevel {
        self.speed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.config.field_width()
            && pos.y >= 0
            && pos.y < self.config.field_height()
    }

    fn check_collision(&self, pos: Position, eating: bool) -> Option<CollisionType> {
        if !self.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if self.state.snake.collides_after_move(pos, eating) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Raise and persist the high score if the current score beats it
    fn record_score(&mut self) -> bool {
        if self.state.score <= self.high_score {
            return false;
        }

        self.high_score = self.state.score;
        tracing::info!(high_score = self.high_score, "new high score");

        if let Err(err) = self.store.save(self.high_score) {
            tracing::warn!("failed to persist high score: {:#}", err);
        }
        true
    }

    fn end_round(&mut self, reason: EndReason) {
        self.scheduler.disarm();
        self.state.phase = GamePhase::Over;
        self.state.end_reason = Some(reason);
        tracing::debug!(?reason, score = self.state.score, steps = self.state.steps, "round over");
        self.publish();
    }

    fn publish(&self) {
        self.notifier.send_replace(self.snapshot());
    }
}

/// Pick a uniformly random cell not occupied by the snake, or `None` if the
/// board is full
fn place_food<R: Rng>(rng: &mut R, config: &GameConfig, snake: &Snake) -> Option<Position> {
    let unit = config.grid_unit;
    let random_cell = |rng: &mut R| {
        Position::new(
            rng.gen_range(0..config.grid_width) as i32 * unit,
            rng.gen_range(0..config.grid_height) as i32 * unit,
        )
    };

    for _ in 0..FOOD_SAMPLE_ATTEMPTS {
        let pos = random_cell(rng);
        if !snake.occupies(pos) {
            return Some(pos);
        }
    }

    if snake.len() >= config.cell_count() {
        return None;
    }

    let free: Vec<Position> = (0..config.grid_height as i32)
        .flat_map(|row| (0..config.grid_width as i32).map(move |col| Position::new(col * unit, row * unit)))
        .filter(|pos| !snake.occupies(*pos))
        .collect();

    free.choose(rng).copied()
}
