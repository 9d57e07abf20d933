//! Grid Snake - a timer-driven snake game for the terminal
//!
//! This library provides:
//! - Core game engine with pluggable tick scheduling and high score storage (game module)
//! - Keyboard and swipe input translation (input module)
//! - TUI rendering of engine snapshots (render module)
//! - Session round timing (metrics module)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
