use crate::config::{DemoConfig, UI_TICK_MS};
use crate::error::Result;
use crate::fetch::Transport;
use crate::tui::metrics_tab::MetricsTab;
use crate::tui::products_tab::ProductsTab;
use crate::tui::stream::async_key_events;
use crate::tui::theme::{DeckTheme, Symbols, TextType, UiConstants};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::stream::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Products,
    Metrics,
}

impl Tab {
    const fn index(self) -> usize {
        match self {
            Self::Products => 0,
            Self::Metrics => 1,
        }
    }

    const fn other(self) -> Self {
        match self {
            Self::Products => Self::Metrics,
            Self::Metrics => Self::Products,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckCommand {
    Continue,
    Quit,
}

/// Top-level UI state. Only the visible tab is mounted; switching away drops
/// the other tab and with it its hook.
pub struct Deck {
    transport: Arc<dyn Transport>,
    poll_interval: Duration,
    tab: Tab,
    products: Option<ProductsTab>,
    metrics: Option<MetricsTab>,
    tick: usize,
}

impl Deck {
    pub fn new(transport: Arc<dyn Transport>, poll_interval: Duration) -> Self {
        let mut deck = Self {
            transport,
            poll_interval,
            tab: Tab::Products,
            products: None,
            metrics: None,
            tick: 0,
        };
        deck.mount(Tab::Products);
        deck
    }

    fn mount(&mut self, tab: Tab) {
        info!(?tab, "mounting tab");
        self.tab = tab;
        match tab {
            Tab::Products => {
                self.metrics = None;
                self.products = Some(ProductsTab::mount(self.transport.clone()));
            }
            Tab::Metrics => {
                self.products = None;
                self.metrics = Some(MetricsTab::mount(self.transport.clone(), self.poll_interval));
            }
        }
    }

    pub const fn tab(&self) -> Tab {
        self.tab
    }

    pub const fn products(&self) -> Option<&ProductsTab> {
        self.products.as_ref()
    }

    pub const fn metrics(&self) -> Option<&MetricsTab> {
        self.metrics.as_ref()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> DeckCommand {
        if key.kind != KeyEventKind::Press {
            return DeckCommand::Continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return DeckCommand::Quit,
            KeyCode::Tab | KeyCode::BackTab => {
                self.mount(self.tab.other());
                return DeckCommand::Continue;
            }
            _ => {}
        }

        let handled = match (self.tab, &mut self.products, &mut self.metrics) {
            (Tab::Products, Some(products), _) => products.handle_key(key.code),
            (Tab::Metrics, _, Some(metrics)) => metrics.handle_key(key.code),
            _ => false,
        };
        if !handled {
            tracing::trace!(code = ?key.code, "unhandled key");
        }
        DeckCommand::Continue
    }

    fn draw(&self, f: &mut Frame) {
        let theme = DeckTheme::default();
        f.render_widget(
            Block::default().style(Style::default().bg(theme.bg_primary)),
            f.area(),
        );

        let chunks = Layout::vertical([
            Constraint::Length(UiConstants::HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(UiConstants::FOOTER_HEIGHT),
        ])
        .split(f.area());

        let tabs = Tabs::new(vec![" Products ", " Live metrics "])
            .select(self.tab.index())
            .style(theme.text_style(TextType::Caption))
            .highlight_style(
                Style::default()
                    .fg(theme.text_primary)
                    .bg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .title(" fetchdeck ")
                    .title_style(theme.text_style(TextType::Title))
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(theme.divider)),
            );
        f.render_widget(tabs, chunks[0]);

        match (self.tab, &self.products, &self.metrics) {
            (Tab::Products, Some(products), _) => products.draw(f, chunks[1], &theme, self.tick),
            (Tab::Metrics, _, Some(metrics)) => metrics.draw(f, chunks[1], &theme, self.tick),
            _ => {}
        }

        let hints = match self.tab {
            Tab::Products => "1-3: endpoint • r: refetch • v: layout • Tab: switch • q: quit",
            Tab::Metrics => "i: interval • Tab: switch • q: quit",
        };
        let footer = Paragraph::new(format!("{} {hints}", Symbols::BULLET))
            .style(theme.text_style(TextType::Caption))
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(theme.border_focus)),
            );
        f.render_widget(footer, chunks[2]);
    }

    /// Resolves when the mounted tab publishes new state
    async fn changed(&mut self) {
        match (&mut self.products, &mut self.metrics) {
            (Some(products), _) => products.changed().await,
            (_, Some(metrics)) => metrics.changed().await,
            _ => std::future::pending::<()>().await,
        }
    }
}

/// # Errors
///
/// Will return `Err` if function cannot access a terminal or render a ui
pub async fn run(transport: Arc<dyn Transport>, config: &DemoConfig) -> Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_root_ui_loop(&mut terminal, Deck::new(transport, config.poll_interval)).await;

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("{err}");
    }

    res
}

async fn run_root_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut deck: Deck,
) -> Result<()> {
    let should_stop = Arc::new(AtomicBool::new(false));
    let mut key_events = async_key_events(should_stop.clone());
    let mut ticker = tokio::time::interval(Duration::from_millis(UI_TICK_MS));

    loop {
        terminal.draw(|f| deck.draw(f))?;

        tokio::select! {
            event = key_events.next() => match event {
                Some(Event::Key(key)) => {
                    if deck.handle_key(&key) == DeckCommand::Quit {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            },
            () = deck.changed() => {}
            _ = ticker.tick() => {
                deck.tick = deck.tick.wrapping_add(1);
            }
        }
    }

    should_stop.store(true, Ordering::Relaxed);
    info!("ui loop finished");
    Ok(())
}
