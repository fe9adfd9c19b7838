//! Terminal styling and color utilities.
//!
//! ANSI escape codes for the route category tags plus color detection that
//! honours the usual opt-out conventions.

use routegen_lib::RouteCategory;

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    /// Bold reverse yellow for main road tags.
    pub const TAG_MAIN: &str = "\x1b[1;7;33m";
    /// Bold reverse green for trail tags.
    pub const TAG_TRAIL: &str = "\x1b[1;7;32m";
    /// Bold reverse cyan for sea route tags.
    pub const TAG_SEA: &str = "\x1b[1;7;36m";

    /// Bright bold white for headings.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for cell chains and secondary numbers.
    pub const GRAY: &str = "\x1b[90m";
}

/// Resolved color codes, either ANSI sequences or empty strings when color
/// is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_main: &'static str,
    pub tag_trail: &'static str,
    pub tag_sea: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_main: colors::TAG_MAIN,
            tag_trail: colors::TAG_TRAIL,
            tag_sea: colors::TAG_SEA,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_main: "",
            tag_trail: "",
            tag_sea: "",
            white_bold: "",
            gray: "",
        }
    }

    /// `colored()` when the terminal supports ANSI colors, otherwise `plain()`.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn tag(&self, category: RouteCategory) -> &'static str {
        match category {
            RouteCategory::Main => self.tag_main,
            RouteCategory::Trail => self.tag_trail,
            RouteCategory::Sea => self.tag_sea,
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if the terminal supports ANSI color codes.
///
/// Respects `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

/// Format a number with thousand separators (commas).
///
/// ```
/// # use routegen_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(999), "999");
/// assert_eq!(format_with_separators(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
