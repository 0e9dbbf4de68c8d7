use crate::fetch::FetchView;
use crate::tui::theme::{DeckTheme, LoadStatus, Symbols, TextType, UiConstants};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Frames a keyed fetch and hands the body to a caller-supplied renderer.
///
/// The view only owns the chrome: title, status badge and a one-line banner
/// for loading and errors. Whatever goes inside is decided by the `body`
/// callback, which always receives concrete data (an empty list before the
/// first success, the last good data after a failure).
pub struct DataView<'a, T> {
    title: &'a str,
    view: &'a FetchView<T>,
    has_data: bool,
    tick: usize,
}

impl<'a, T> DataView<'a, T> {
    pub const fn new(title: &'a str, view: &'a FetchView<T>, has_data: bool) -> Self {
        Self {
            title,
            view,
            has_data,
            tick: 0,
        }
    }

    /// Animation frame for the loading spinner
    #[must_use]
    pub const fn tick(mut self, tick: usize) -> Self {
        self.tick = tick;
        self
    }

    pub const fn status(&self) -> LoadStatus {
        LoadStatus::from_flags(self.view.is_loading, self.view.error.is_some(), self.has_data)
    }

    /// Banner text and style, if anything needs saying
    pub fn banner(&self, theme: &DeckTheme) -> Option<(String, Style)> {
        if self.view.is_loading {
            let spinner = Symbols::SPINNER[self.tick % Symbols::SPINNER.len()];
            let text = if self.view.is_initial_loading(self.has_data) {
                format!("{spinner} Loading {}...", self.title.to_lowercase())
            } else {
                format!("{spinner} Refreshing...")
            };
            return Some((text, theme.text_style(TextType::Warning)));
        }
        self.view.error.as_ref().map(|error| {
            (
                format!("{} {error} {} press r to retry", Symbols::ERROR, Symbols::BULLET),
                theme.text_style(TextType::Error),
            )
        })
    }

    pub fn render<F>(self, f: &mut Frame, area: Rect, theme: &DeckTheme, body: F)
    where
        F: FnOnce(&mut Frame, Rect, &FetchView<T>),
    {
        let status = self.status();
        let title = Line::from(vec![
            Span::styled(format!(" {} ", self.title), theme.text_style(TextType::Subtitle)),
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

        let chunks = Layout::vertical([
            Constraint::Length(UiConstants::BANNER_HEIGHT),
            Constraint::Min(0),
        ])
        .split(inner);

        if let Some((text, style)) = self.banner(theme) {
            f.render_widget(Paragraph::new(text).style(style.bg(theme.bg_secondary)), chunks[0]);
        }

        body(f, chunks[1], self.view);
    }
}
