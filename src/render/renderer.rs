use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::time::Instant;

use crate::game::{CollisionType, EndReason, GamePhase, GameSnapshot, Position};
use crate::metrics::SessionMetrics;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, snapshot: &GameSnapshot, metrics: &SessionMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(snapshot, metrics);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match snapshot.state.phase {
            GamePhase::Over => {
                frame.render_widget(self.render_game_over(snapshot), game_area);
            }
            GamePhase::Idle => {
                frame.render_widget(self.render_grid(snapshot), game_area);
                self.render_banner(frame, game_area, "Press an arrow key to start", Color::Green);
            }
            GamePhase::Paused => {
                frame.render_widget(self.render_grid(snapshot), game_area);
                self.render_banner(frame, game_area, "PAUSED - Space to resume", Color::Yellow);
            }
            GamePhase::Running => {
                frame.render_widget(self.render_grid(snapshot), game_area);
            }
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid(&self, snapshot: &GameSnapshot) -> Paragraph<'_> {
        let state = &snapshot.state;
        let head = snapshot.cell_of(state.snake.head());
        let food = snapshot.cell_of(state.food);
        let mut lines = Vec::with_capacity(snapshot.grid_height);

        for y in 0..snapshot.grid_height {
            let mut spans = Vec::with_capacity(snapshot.grid_width);

            for x in 0..snapshot.grid_width {
                let pos = Position::new(x as i32 * snapshot.grid_unit, y as i32 * snapshot.grid_unit);

                let cell = if (x, y) == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::LightGreen)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.occupies(pos) {
                    Span::styled("■ ", Style::default().fg(Color::Green))
                } else if (x, y) == food {
                    Span::styled(
                        "● ",
                        Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, snapshot: &GameSnapshot, metrics: &SessionMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                snapshot.state.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(snapshot.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(
                format!("{} ({}ms)", snapshot.speed.get(), snapshot.interval.as_millis()),
                value,
            ),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(Instant::now()), value),
            Span::raw("    "),
            Span::styled("Rounds: ", label),
            Span::styled(metrics.rounds_played.to_string(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect, message: &'static str, color: Color) {
        let width = (message.len() as u16 + 4).min(area.width);
        let banner_area = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(3) / 2,
            width,
            height: 3.min(area.height),
        };

        let banner = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );

        frame.render_widget(Clear, banner_area);
        frame.render_widget(banner, banner_area);
    }

    fn render_game_over(&self, snapshot: &GameSnapshot) -> Paragraph<'_> {
        let state = &snapshot.state;
        let headline = match state.end_reason {
            Some(EndReason::BoardFilled) => "YOU FILLED THE BOARD",
            _ => "GAME OVER",
        };
        let cause = match state.end_reason {
            Some(EndReason::Collision(CollisionType::Wall)) => "Hit the wall",
            Some(EndReason::Collision(CollisionType::SelfCollision)) => "Ran into yourself",
            Some(EndReason::BoardFilled) | None => "",
        };

        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                headline,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(cause, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if state.score > 0 && state.score == snapshot.high_score {
            text.push(Line::from(Span::styled(
                "New high score!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        }

        text.extend([
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ]);

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let key = Style::default().fg(Color::Cyan);

        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", key),
            Span::raw("/"),
            Span::styled("WASD", key),
            Span::raw("/swipe move | "),
            Span::styled("Space", key),
            Span::raw(" pause | "),
            Span::styled("1-0 +/-", key),
            Span::raw(" speed | "),
            Span::styled("R", key),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameEngine, MemoryStore, TokioTicker};
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_idle_screen_shows_hint_and_scores() {
        let (ticker, _rx) = TokioTicker::new();
        let engine = GameEngine::with_seed(GameConfig::small(), MemoryStore::with_score(70), ticker, 1).unwrap();
        let snapshot = engine.snapshot();

        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, &snapshot, &SessionMetrics::new()))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Press an arrow key to start"));
        assert!(text.contains("Best: 70"));
        assert!(text.contains("Speed: 5 (200ms)"));
    }

    #[tokio::test]
    async fn test_game_over_screen() {
        let (ticker, _rx) = TokioTicker::new();
        let mut engine = GameEngine::with_seed(GameConfig::small(), MemoryStore::new(), ticker, 1).unwrap();
        engine.set_direction(crate::game::Direction::Up);
        while engine.step() != crate::game::StepOutcome::Collided(CollisionType::Wall) {}
        let snapshot = engine.snapshot();

        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, &snapshot, &SessionMetrics::new()))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Hit the wall"));
    }
}
