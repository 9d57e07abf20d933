use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc::UnboundedReceiver, watch};
use tokio::time::interval;

use crate::game::{
    GameConfig, GameEngine, GameSnapshot, HighScoreStore, StepOutcome, Tick, TokioTicker,
};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::SessionMetrics;
use crate::render::Renderer;

/// Interactive terminal game
pub struct HumanMode<S> {
    engine: GameEngine<S, TokioTicker>,
    ticks: UnboundedReceiver<Tick>,
    snapshots: watch::Receiver<GameSnapshot>,
    metrics: SessionMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl<S: HighScoreStore> HumanMode<S> {
    pub fn new(config: GameConfig, store: S, seed: Option<u64>) -> Result<Self> {
        let (ticker, ticks) = TokioTicker::new();
        let input_handler = InputHandler::new(config.swipe_threshold);

        let engine = match seed {
            Some(seed) => GameEngine::with_seed(config, store, ticker, seed)?,
            None => GameEngine::new(config, store, ticker)?,
        };
        let snapshots = engine.subscribe();

        Ok(Self {
            engine,
            ticks,
            snapshots,
            metrics: SessionMetrics::new(),
            renderer: Renderer::new(),
            input_handler,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        tracing::info!(high_score = self.engine.high_score(), "session started");

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        tracing::info!(
            high_score = self.engine.high_score(),
            rounds = self.metrics.rounds_played,
            "session ended"
        );

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Keeps the round clock in the header moving between ticks
        let mut clock = interval(Duration::from_millis(250));

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            self.draw(terminal)?;

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                Some(tick) = self.ticks.recv() => {
                    if let StepOutcome::Ate { new_high_score: true } = self.engine.on_tick(tick) {
                        tracing::debug!(score = self.engine.state().score, "record extended");
                    }
                }

                _ = clock.tick() => {}

                // Handle Ctrl+C
                _ = &mut ctrl_c => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let snapshot = self.snapshots.borrow_and_update().clone();
        self.metrics.observe(snapshot.state.phase, Instant::now());

        terminal
            .draw(|frame| {
                self.renderer.render(frame, &snapshot, &self.metrics);
            })
            .context("Failed to draw frame")?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let action = match event {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.input_handler.handle_key_event(key)
            }
            Event::Mouse(mouse) => self.input_handler.handle_mouse_event(mouse),
            _ => KeyAction::None,
        };

        match action {
            KeyAction::Command(command) => {
                tracing::trace!(?command, "input");
                self.engine.apply(command);
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Command, Direction, GamePhase, MemoryStore};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_game_initialization() {
        let mode = HumanMode::new(GameConfig::default(), MemoryStore::with_score(40), Some(1)).unwrap();
        assert_eq!(mode.engine.state().phase, GamePhase::Idle);
        assert_eq!(mode.engine.state().score, 0);
        assert_eq!(mode.snapshots.borrow().high_score, 40);
    }

    #[tokio::test]
    async fn test_keys_drive_engine() {
        let mut mode = HumanMode::new(GameConfig::default(), MemoryStore::new(), Some(1)).unwrap();

        mode.handle_event(key(KeyCode::Right));
        assert_eq!(mode.engine.state().phase, GamePhase::Running);
        assert_eq!(mode.engine.state().direction, Some(Direction::Right));

        mode.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(mode.engine.state().phase, GamePhase::Paused);

        mode.handle_event(key(KeyCode::Char('r')));
        assert_eq!(mode.engine.state().phase, GamePhase::Idle);
        assert!(mode.snapshots.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_quit_key() {
        let mut mode = HumanMode::new(GameConfig::default(), MemoryStore::new(), Some(1)).unwrap();
        mode.handle_event(key(KeyCode::Esc));
        assert!(mode.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_step_engine_once_per_interval() {
        let mut mode = HumanMode::new(GameConfig::default(), MemoryStore::new(), Some(1)).unwrap();
        mode.engine.apply(Command::Turn(Direction::Left));
        mode.engine.apply(Command::SetSpeed(10));

        let tick = mode.ticks.recv().await.unwrap();
        assert!(matches!(
            mode.engine.on_tick(tick),
            StepOutcome::Moved | StepOutcome::Ate { .. }
        ));
        assert_eq!(mode.engine.state().steps, 1);
        assert!(mode.ticks.try_recv().is_err());
    }
}
