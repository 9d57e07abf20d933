//! Core game logic module for Snake
//!
//! This module contains the game engine and everything it owns: state,
//! configuration, the tick scheduler seam and high score storage. Nothing in
//! here touches the terminal; presentation reads `GameSnapshot`s published by
//! the engine.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;
pub mod storage;
pub mod timer;

// Re-export commonly used types
pub use action::{Axis, Command, Direction};
pub use config::{GameConfig, SpeedLevel, SPEED_TABLE_MS};
pub use engine::{GameEngine, GameSnapshot, StepOutcome, FOOD_SCORE};
pub use state::{CollisionType, EndReason, GamePhase, GameState, Position, Snake};
pub use storage::{HighScoreStore, JsonFileStore, MemoryStore, HIGH_SCORE_KEY};
pub use timer::{Tick, TickScheduler, TokioTicker};
