use crate::config::{BROKEN_PRODUCTS_PATH, FEATURED_PRODUCTS_PATH, PRODUCTS_PATH};
use crate::data::Product;
use crate::fetch::{FetchHook, FetchState, FetchView, Transport};
use crate::tui::data_view::DataView;
use crate::tui::theme::{DeckTheme, Symbols, TextType, UiConstants};
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

/// Selectable product endpoints: label and key
pub const ENDPOINTS: [(&str, &str); 3] = [
    ("All products", PRODUCTS_PATH),
    ("Featured", FEATURED_PRODUCTS_PATH),
    ("Broken endpoint", BROKEN_PRODUCTS_PATH),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductLayout {
    Table,
    Cards,
}

impl ProductLayout {
    const fn toggle(self) -> Self {
        match self {
            Self::Table => Self::Cards,
            Self::Cards => Self::Table,
        }
    }
}

/// Keyed-fetch tab: one hook, the key chosen from [`ENDPOINTS`]
pub struct ProductsTab {
    hook: FetchHook<Vec<Product>>,
    state_rx: watch::Receiver<FetchState<Vec<Product>>>,
    endpoint: usize,
    layout: ProductLayout,
}

impl ProductsTab {
    pub fn mount(transport: Arc<dyn Transport>) -> Self {
        let hook = FetchHook::new(transport, ENDPOINTS[0].1);
        let state_rx = hook.subscribe();
        Self {
            hook,
            state_rx,
            endpoint: 0,
            layout: ProductLayout::Table,
        }
    }

    /// Returns true if the key belonged to this tab
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                self.select_endpoint(index);
                true
            }
            KeyCode::Char('r' | 'R') => {
                self.hook.refetch().trigger();
                true
            }
            KeyCode::Char('v' | 'V') => {
                self.layout = self.layout.toggle();
                debug!(layout = ?self.layout, "product layout toggled");
                true
            }
            _ => false,
        }
    }

    pub fn select_endpoint(&mut self, index: usize) {
        if let Some((_, key)) = ENDPOINTS.get(index) {
            self.endpoint = index;
            self.hook.set_key(*key);
        }
    }

    pub const fn layout(&self) -> ProductLayout {
        self.layout
    }

    pub fn key(&self) -> &str {
        self.hook.key()
    }

    /// Resolves when the hook publishes new state
    pub async fn changed(&mut self) {
        if self.state_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &DeckTheme, tick: usize) {
        let view = self.hook.view();
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);

        let selector = ENDPOINTS
            .iter()
            .enumerate()
            .map(|(i, (label, _))| {
                let style = if i == self.endpoint {
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
                } else {
                    theme.text_style(TextType::Caption)
                };
                Span::styled(format!(" {}:{label} ", i + 1), style)
            })
            .collect::<Vec<_>>();
        f.render_widget(Paragraph::new(Line::from(selector)), chunks[0]);

        let data_view = DataView::new("Products", &view, !view.data.is_empty()).tick(tick);
        match self.layout {
            ProductLayout::Table => data_view.render(f, chunks[1], theme, |f, area, view| {
                render_table(f, area, view, theme);
            }),
            ProductLayout::Cards => data_view.render(f, chunks[1], theme, |f, area, view| {
                render_cards(f, area, view, theme);
            }),
        }
    }
}

fn render_table(f: &mut Frame, area: Rect, view: &FetchView<Vec<Product>>, theme: &DeckTheme) {
    if view.data.is_empty() {
        render_empty(f, area, view, theme);
        return;
    }

    let (id_len, name_len, price_len, _) = product_constraint_len_calculator(&view.data);
    let header = Row::new(["ID", "Name", "Price", "Description"])
        .style(theme.text_style(TextType::Subtitle));
    let rows = view.data.iter().map(|p| {
        Row::new(vec![
            Cell::from(p.id.to_string()),
            Cell::from(p.name.clone()),
            Cell::from(p.display_price()),
            Cell::from(p.description.clone()),
        ])
        .style(theme.text_style(TextType::Body))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(id_len.max(2) + 1),
            Constraint::Length(name_len + 1),
            Constraint::Length(price_len + 1),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .style(Style::default().bg(theme.bg_secondary));
    f.render_widget(table, area);
}

fn render_cards(f: &mut Frame, area: Rect, view: &FetchView<Vec<Product>>, theme: &DeckTheme) {
    if view.data.is_empty() {
        render_empty(f, area, view, theme);
        return;
    }

    let mut y_offset = 0;
    for product in &view.data {
        if y_offset + UiConstants::CARD_HEIGHT > area.height {
            break;
        }
        let card_area = Rect {
            x: area.x,
            y: area.y + y_offset,
            width: area.width,
            height: UiConstants::CARD_HEIGHT,
        };
        let card = Paragraph::new(vec![
            Line::from(vec![
                Span::styled(product.name.clone(), theme.text_style(TextType::Title)),
                Span::styled(
                    format!(" {} {}", Symbols::BULLET, product.display_price()),
                    Style::default().fg(theme.success),
                ),
            ]),
            Line::styled(product.description.clone(), theme.text_style(TextType::Caption)),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.divider))
                .style(Style::default().bg(theme.bg_tertiary)),
        );
        f.render_widget(card, card_area);
        y_offset += UiConstants::CARD_HEIGHT;
    }
}

fn render_empty(f: &mut Frame, area: Rect, view: &FetchView<Vec<Product>>, theme: &DeckTheme) {
    let text = if view.is_loading || view.error.is_some() {
        ""
    } else {
        "No products found"
    };
    f.render_widget(
        Paragraph::new(text)
            .style(theme.text_style(TextType::Caption))
            .alignment(Alignment::Center),
        area,
    );
}

#[allow(clippy::cast_possible_truncation)]
pub fn product_constraint_len_calculator(items: &[Product]) -> (u16, u16, u16, u16) {
    let id_len = items
        .iter()
        .map(|p| p.id.to_string().width())
        .max()
        .unwrap_or(0);
    let name_len = items
        .iter()
        .map(|p| p.name.as_str())
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    let price_len = items
        .iter()
        .map(|p| p.display_price().width())
        .max()
        .unwrap_or(0);
    let description_len = items
        .iter()
        .map(|p| p.description.as_str())
        .flat_map(str::lines)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);

    (
        id_len as u16,
        name_len as u16,
        price_len as u16,
        description_len as u16,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_constraint_lengths() {
        let items = vec![
            Product::new(1, "Mug", 4.0, "short"),
            Product::new(12, "Headlamp", 39.99, "a longer line"),
        ];
        assert_eq!(product_constraint_len_calculator(&items), (2, 8, 6, 13));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_drive_the_hook() {
        let mut tab = ProductsTab::mount(Arc::new(MockTransport::demo().unwrap()));
        assert!(tab.handle_key(KeyCode::Char('2')));
        assert_eq!(tab.key(), FEATURED_PRODUCTS_PATH);
        assert!(tab.handle_key(KeyCode::Char('v')));
        assert_eq!(tab.layout(), ProductLayout::Cards);
        assert!(tab.handle_key(KeyCode::Char('r')));
        assert_eq!(tab.hook.refetch().count(), 1);
        assert!(!tab.handle_key(KeyCode::Char('x')));
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_products_after_load() {
        let tab = ProductsTab::mount(Arc::new(MockTransport::demo().unwrap()));
        tokio::time::sleep(Duration::from_secs(2)).await;

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|f| tab.draw(f, f.area(), &DeckTheme::default(), 0))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Trail Runner"));
        assert!(text.contains("$129.99"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_error_banner() {
        let mut tab = ProductsTab::mount(Arc::new(MockTransport::demo().unwrap()));
        tab.select_endpoint(2);
        tokio::time::sleep(Duration::from_secs(2)).await;

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|f| tab.draw(f, f.area(), &DeckTheme::default(), 0))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("request failed with status 500"));
    }
}
