use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::countdown::CountdownDisplay;
use crate::store::ClockStore;
use crate::ticker::TickEvent;

pub struct App<C: Clock> {
    pub should_quit: bool,
    pub config: Config,
    pub store: ClockStore<C>,
    pub displays: Vec<CountdownDisplay>,
    pub scroll_offset: usize,
    pub skipped_ticks: u64,
    pub last_tick: u64,
}

impl<C: Clock> App<C> {
    pub fn new(config: Config, clock: C) -> Result<App<C>> {
        let store = ClockStore::new(clock).context("Failed to read the clock at startup")?;

        let displays = config
            .countdowns
            .iter()
            .cloned()
            .map(|countdown| CountdownDisplay::new(countdown, store.reader()))
            .collect::<Vec<_>>();
        info!("Tracking {} countdowns from {}", displays.len(), store.now());
        for countdown_display in &displays {
            debug!("Countdown {}", countdown_display.countdown);
        }

        Ok(App {
            should_quit: false,
            config,
            store,
            displays,
            scroll_offset: 0,
            skipped_ticks: 0,
            last_tick: 0,
        })
    }

    /// Refresh the shared clock. A clock failure skips this tick only.
    pub fn handle_tick(&mut self, event: TickEvent) {
        let TickEvent::Tick { sequence } = event;
        self.last_tick = sequence;

        match self.store.refresh_now() {
            Ok(()) => debug!("Tick {} -> now = {}", sequence, self.store.now()),
            Err(e) => {
                self.skipped_ticks += 1;
                warn!("Skipping tick {}: {}", sequence, e);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                info!("Quit requested by user");
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                info!("Ctrl+C pressed, quitting");
                self.should_quit = true;
            }
            KeyCode::Esc => {
                info!("Escape pressed, quitting");
                self.should_quit = true;
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            _ => {}
        }
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset + 1 < self.displays.len() {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
        }
    }

    pub fn ui(&self, f: &mut ratatui::Frame) {
        use ratatui::{
            layout::{Constraint, Direction, Layout},
            prelude::Stylize,
            style::{Color, Modifier, Style},
            text::{Line, Span},
            widgets::{Block, Borders, Paragraph},
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(1),    // Countdowns
                Constraint::Length(3), // Footer
            ])
            .split(f.area());

        let title = Paragraph::new(format!("tickshare    now {}", self.store.now()))
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        f.render_widget(title, chunks[0]);

        let content_lines = if self.displays.is_empty() {
            vec![Line::from("No countdowns configured. Add some with --countdown LABEL=EPOCH.")]
        } else {
            let label_width = self
                .displays
                .iter()
                .map(|d| d.countdown.label.chars().count())
                .max()
                .unwrap_or(0);

            self.displays
                .iter()
                .map(|display| {
                    let text = display.render_text(self.config.ui.show_days, &self.config.ui.expired_text);
                    let style = if display.is_expired() {
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Green)
                    };
                    Line::from(vec![
                        Span::raw(format!("  {:<width$}  ", display.countdown.label, width = label_width)),
                        Span::styled(text, style),
                    ])
                })
                .collect()
        };

        // Apply scrolling: calculate visible area and slice content
        let available_height = chunks[1].height.saturating_sub(2) as usize; // Minus borders
        let visible_lines = if content_lines.len() > available_height && available_height > 0 {
            // Keep the viewport full once the last row is on screen
            let start = self.scroll_offset.min(content_lines.len() - available_height);
            let end = (start + available_height).min(content_lines.len());
            content_lines[start..end].to_vec()
        } else {
            content_lines
        };

        let main_content = Paragraph::new(visible_lines)
            .block(Block::default().borders(Borders::ALL).title("Countdowns"))
            .style(Style::default().fg(Color::White));
        f.render_widget(main_content, chunks[1]);

        let mut footer_spans = vec![
            "Press ".into(),
            "↑↓".fg(Color::Yellow).add_modifier(Modifier::BOLD),
            "/".into(),
            "j,k".fg(Color::Yellow).add_modifier(Modifier::BOLD),
            " to scroll, ".into(),
            "q".fg(Color::Yellow).add_modifier(Modifier::BOLD),
            " to quit".into(),
        ];
        if self.skipped_ticks > 0 {
            footer_spans.push(Span::styled(
                format!("   skipped ticks: {}", self.skipped_ticks),
                Style::default().fg(Color::Red),
            ));
        }
        let footer = Paragraph::new(Line::from(footer_spans))
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray));
        f.render_widget(footer, chunks[2]);
    }
}
