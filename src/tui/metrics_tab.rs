use crate::config::{METRICS_PATH, POLL_INTERVAL_PRESETS_MS};
use crate::data::Metric;
use crate::fetch::{PollState, PollingHook, Transport};
use crate::tui::theme::{DeckTheme, LoadStatus, Symbols, TextType};
use chrono::{DateTime, Local};
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Polling tab: one hook against the metrics endpoint
pub struct MetricsTab {
    hook: PollingHook<Vec<Metric>>,
    state_rx: watch::Receiver<PollState<Vec<Metric>>>,
    last_update: Option<DateTime<Local>>,
}

impl MetricsTab {
    pub fn mount(transport: Arc<dyn Transport>, interval: Duration) -> Self {
        let hook = PollingHook::new(transport, METRICS_PATH, Some(interval));
        let state_rx = hook.subscribe();
        Self {
            hook,
            state_rx,
            last_update: None,
        }
    }

    /// Returns true if the key belonged to this tab
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('i' | 'I') => {
                let next = next_interval(self.hook.interval());
                self.hook.set_params(METRICS_PATH, next);
                true
            }
            _ => false,
        }
    }

    pub const fn interval(&self) -> Option<Duration> {
        self.hook.interval()
    }

    /// Resolves when the hook publishes new state
    pub async fn changed(&mut self) {
        if self.state_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        let state = self.state_rx.borrow_and_update();
        if !state.is_loading && !state.error {
            self.last_update = Some(Local::now());
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &DeckTheme, tick: usize) {
        let state = self.hook.state();
        let status = LoadStatus::from_flags(state.is_loading, state.error, !state.data.is_empty());

        let interval_text = self
            .hook
            .interval()
            .filter(|i| !i.is_zero())
            .map_or_else(|| "polling off".to_string(), |i| format!("every {}ms", i.as_millis()));
        let updated_text = self
            .last_update
            .map_or_else(|| "never".to_string(), |t| t.format("%H:%M:%S").to_string());

        let title = Line::from(vec![
            Span::styled(" Live metrics ", theme.text_style(TextType::Subtitle)),
            Span::styled(
                format!("{} {} ", status.symbol(), status.label()),
                Style::default().fg(theme.status_color(status)),
            ),
        ]);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border).bg(theme.bg_secondary))
            .style(Style::default().bg(theme.bg_secondary));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);

        let mut info = vec![Span::styled(
            format!("{interval_text} {} updated {updated_text}", Symbols::BULLET),
            theme.text_style(TextType::Caption),
        )];
        if state.is_loading {
            let spinner = Symbols::SPINNER[tick % Symbols::SPINNER.len()];
            info.push(Span::styled(format!("  {spinner}"), theme.text_style(TextType::Warning)));
        } else if state.error {
            info.push(Span::styled(
                format!("  {} metrics unavailable", Symbols::ERROR),
                theme.text_style(TextType::Error),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(info)), chunks[0]);

        let rows = state.data.iter().map(|m| {
            Row::new(vec![
                Cell::from(m.name.clone()),
                Cell::from(m.display_value()),
            ])
            .style(theme.text_style(TextType::Body))
        });
        let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(10)])
            .header(Row::new(["Metric", "Value"]).style(theme.text_style(TextType::Subtitle)));
        f.render_widget(table, chunks[1]);
    }
}

/// Next entry of the interval presets, wrapping around
pub fn next_interval(current: Option<Duration>) -> Option<Duration> {
    let current_ms = current.map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    let position = POLL_INTERVAL_PRESETS_MS
        .iter()
        .position(|&ms| ms == current_ms)
        .unwrap_or(0);
    let next = POLL_INTERVAL_PRESETS_MS[(position + 1) % POLL_INTERVAL_PRESETS_MS.len()];
    if next == 0 {
        None
    } else {
        Some(Duration::from_millis(next))
    }
}
