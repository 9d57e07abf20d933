use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::state::Position;

/// Tick interval in milliseconds for speed levels 1 through 10
pub const SPEED_TABLE_MS: [u64; 10] = [400, 350, 300, 250, 200, 150, 120, 100, 80, 60];

/// Speed level, always within `SpeedLevel::MIN..=SpeedLevel::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Create a speed level, clamping out-of-range values
    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Time between two ticks at this level
    pub fn interval(&self) -> Duration {
        Duration::from_millis(SPEED_TABLE_MS[(self.0 - Self::MIN) as usize])
    }

    pub fn faster(&self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    pub fn slower(&self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        Self(5)
    }
}

impl From<u8> for SpeedLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<SpeedLevel> for u8 {
    fn from(level: SpeedLevel) -> Self {
        level.0
    }
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Side length of one cell; every coordinate is a multiple of it
    pub grid_unit: i32,
    /// Speed level used when the engine starts
    pub speed_level: SpeedLevel,
    /// Minimum drag distance, in terminal cells, recognised as a swipe
    pub swipe_threshold: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            grid_unit: 20,
            speed_level: SpeedLevel::default(),
            swipe_threshold: 3,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width >= 2 && self.grid_height >= 2,
            "grid must be at least 2x2 cells, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(self.grid_unit > 0, "grid_unit must be positive, got {}", self.grid_unit);
        ensure!(self.swipe_threshold > 0, "swipe_threshold must be positive");

        // Field coordinates are i32; every cell and the far edges must fit
        let fits = i32::try_from(self.grid_width)
            .ok()
            .zip(i32::try_from(self.grid_height).ok())
            .and_then(|(w, h)| w.checked_mul(self.grid_unit).zip(h.checked_mul(self.grid_unit)))
            .is_some();
        ensure!(
            fits,
            "field of {}x{} cells with unit {} does not fit in i32 coordinates",
            self.grid_width,
            self.grid_height,
            self.grid_unit
        );
        ensure!(
            self.grid_width.checked_mul(self.grid_height).is_some(),
            "grid of {}x{} cells is too large",
            self.grid_width,
            self.grid_height
        );
        Ok(())
    }

    /// Playing-field width W
    pub fn field_width(&self) -> i32 {
        self.grid_width as i32 * self.grid_unit
    }

    /// Playing-field height H
    pub fn field_height(&self) -> i32 {
        self.grid_height as i32 * self.grid_unit
    }

    /// Field centre snapped to the grid
    pub fn start_position(&self) -> Position {
        Position::new(
            (self.grid_width / 2) as i32 * self.grid_unit,
            (self.grid_height / 2) as i32 * self.grid_unit,
        )
    }

    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.field_width(), 400);
        assert_eq!(config.start_position(), Position::new(200, 200));
        assert_eq!(config.speed_level.get(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 12);
        assert_eq!(config.field_width(), 300);
        assert_eq!(config.field_height(), 240);
        assert_eq!(config.start_position(), Position::new(140, 120));
    }

    #[test]
    fn test_invalid_config() {
        assert!(GameConfig::new(1, 10).validate().is_err());

        let config = GameConfig {
            grid_unit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_field_rejected() {
        let config = GameConfig {
            grid_width: 3,
            grid_height: 3,
            grid_unit: 1_000_000_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(GameConfig::new(i32::MAX as usize + 1, 2).validate().is_err());
        assert!(GameConfig::new(2, usize::MAX).validate().is_err());

        let largest = GameConfig {
            grid_width: 1000,
            grid_height: 1000,
            grid_unit: 1000,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
        assert_eq!(largest.field_width(), 1_000_000);
    }

    #[test]
    fn test_oversized_config_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.json");
        std::fs::write(&path, r#"{"grid_width": 3, "grid_height": 3, "grid_unit": 1000000000}"#).unwrap();

        assert!(GameConfig::from_json_file(&path).is_err());
    }

    #[test]
    fn test_speed_level_clamped() {
        assert_eq!(SpeedLevel::new(0).get(), 1);
        assert_eq!(SpeedLevel::new(42).get(), 10);
        assert_eq!(SpeedLevel::new(7).get(), 7);
        assert_eq!(SpeedLevel::new(10).faster().get(), 10);
        assert_eq!(SpeedLevel::new(1).slower().get(), 1);
    }

    #[test]
    fn test_speed_table() {
        assert_eq!(SpeedLevel::new(1).interval(), Duration::from_millis(400));
        assert_eq!(SpeedLevel::new(5).interval(), Duration::from_millis(200));
        assert_eq!(SpeedLevel::new(10).interval(), Duration::from_millis(60));

        for level in SpeedLevel::MIN..SpeedLevel::MAX {
            assert!(SpeedLevel::new(level).interval() > SpeedLevel::new(level + 1).interval());
        }
    }

    #[test]
    fn test_config_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snake.json");
        std::fs::write(&path, r#"{"grid_width": 30, "speed_level": 99}"#).unwrap();

        let config = GameConfig::from_json_file(&path).unwrap();
        assert_eq!(config.grid_width, 30);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.speed_level.get(), 10);
    }
}
