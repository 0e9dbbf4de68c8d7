use ratatui::prelude::*;

/// Palette for the demo, a slate dark theme
#[derive(Clone, Debug)]
pub struct DeckTheme {
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_tertiary: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub border: Color,
    pub border_focus: Color,
    pub divider: Color,
}

impl Default for DeckTheme {
    fn default() -> Self {
        Self::slate()
    }
}

impl DeckTheme {
    #[allow(clippy::unreadable_literal)] // Color codes are more readable as hex without underscores
    pub fn slate() -> Self {
        Self {
            primary: Color::from_u32(0x2563EB),
            accent: Color::from_u32(0x06B6D4),
            success: Color::from_u32(0x10B981),
            warning: Color::from_u32(0xF59E0B),
            error: Color::from_u32(0xEF4444),

            bg_primary: Color::from_u32(0x0F172A),
            bg_secondary: Color::from_u32(0x1E293B),
            bg_tertiary: Color::from_u32(0x334155),

            text_primary: Color::from_u32(0xF8FAFC),
            text_secondary: Color::from_u32(0xCBD5E1),
            text_muted: Color::from_u32(0x94A3B8),

            border: Color::from_u32(0x475569),
            border_focus: Color::from_u32(0x2563EB),
            divider: Color::from_u32(0x334155),
        }
    }

    pub fn status_color(&self, status: LoadStatus) -> Color {
        match status {
            LoadStatus::Ready => self.success,
            LoadStatus::Loading => self.warning,
            LoadStatus::Failed => self.error,
            LoadStatus::Idle => self.text_muted,
        }
    }

    pub fn text_style(&self, content_type: TextType) -> Style {
        match content_type {
            TextType::Title => Style::default()
                .fg(self.text_primary)
                .add_modifier(Modifier::BOLD),
            TextType::Subtitle => Style::default()
                .fg(self.text_secondary)
                .add_modifier(Modifier::BOLD),
            TextType::Body => Style::default().fg(self.text_primary),
            TextType::Caption => Style::default().fg(self.text_muted),
            TextType::Warning => Style::default()
                .fg(self.warning)
                .add_modifier(Modifier::BOLD),
            TextType::Error => Style::default()
                .fg(self.error)
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// Coarse state of a fetch for status badges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl LoadStatus {
    pub const fn from_flags(is_loading: bool, has_error: bool, has_data: bool) -> Self {
        if is_loading {
            Self::Loading
        } else if has_error {
            Self::Failed
        } else if has_data {
            Self::Ready
        } else {
            Self::Idle
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Loading => Symbols::PENDING,
            Self::Ready => Symbols::SUCCESS,
            Self::Failed => Symbols::ERROR,
            Self::Idle => Symbols::DOT,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TextType {
    Title,
    Subtitle,
    Body,
    Caption,
    Warning,
    Error,
}

pub struct Symbols;

impl Symbols {
    pub const PENDING: &'static str = "◐";
    pub const ERROR: &'static str = "✗";
    pub const SUCCESS: &'static str = "✓";
    pub const BULLET: &'static str = "•";
    pub const DOT: &'static str = "·";
    pub const SPINNER: [&'static str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
}

/// Sizes shared by both tabs
pub struct UiConstants;

impl UiConstants {
    pub const HEADER_HEIGHT: u16 = 3;
    pub const FOOTER_HEIGHT: u16 = 2;
    pub const BANNER_HEIGHT: u16 = 1;
    pub const CARD_HEIGHT: u16 = 4;
}
