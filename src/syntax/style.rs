//! Style types for text rendering
//!
//! Colours, text attributes and the per-category theme that style tags
//! carry when the display paints them.

use super::tokens::TokenCategory;

/// Terminal colors (ANSI 16-color palette plus 24-bit RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse `#rrggbb` or an ANSI colour name such as `cyan` / `bright-black`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        }

        let name = s.to_lowercase().replace(['_', ' '], "-");
        let color = match name.as_str() {
            "default" => Color::Default,
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "bright-black" | "grey" | "gray" => Color::BrightBlack,
            "bright-red" => Color::BrightRed,
            "bright-green" => Color::BrightGreen,
            "bright-yellow" => Color::BrightYellow,
            "bright-blue" => Color::BrightBlue,
            "bright-magenta" => Color::BrightMagenta,
            "bright-cyan" => Color::BrightCyan,
            "bright-white" => Color::BrightWhite,
            _ => return None,
        };
        Some(color)
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Bold text
    pub bold: bool,
    /// Italic (slanted) text
    pub italic: bool,
    /// Reverse video (swap fg/bg)
    pub reverse: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Layer this style on top of `base`; unset colours fall through
    pub fn over(self, base: Style) -> Style {
        Style {
            fg: if self.fg == Color::Default { base.fg } else { self.fg },
            bg: if self.bg == Color::Default { base.bg } else { self.bg },
            bold: self.bold || base.bold,
            italic: self.italic || base.italic,
            reverse: self.reverse || base.reverse,
        }
    }
}

/// Visual styles for the editing surface and every token category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Plain text on the editor background
    pub base: Style,
    /// Gutter line-number labels
    pub gutter: Style,
    /// Indexed by `TokenCategory::index`
    categories: [Style; TokenCategory::COUNT],
}

impl Theme {
    /// Style carried by a category's tag
    pub fn style(&self, category: TokenCategory) -> Style {
        self.categories[category.index()]
    }

    /// Replace the style of a category
    pub fn set_style(&mut self, category: TokenCategory, style: Style) {
        self.categories[category.index()] = style;
    }
}

impl Default for Theme {
    fn default() -> Self {
        let navy = Color::Rgb(0x13, 0x22, 0x57);
        let grey = Color::Rgb(0xd3, 0xd3, 0xd3);
        let mut categories = [Style::default(); TokenCategory::COUNT];
        for category in TokenCategory::APPLY_ORDER {
            categories[category.index()] = category.default_style();
        }
        Self {
            base: Style::fg(grey).with_bg(navy),
            gutter: Style::fg(grey).with_bg(navy).with_bold(),
            categories,
        }
    }
}
