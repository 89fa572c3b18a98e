use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles by role in the client's output
#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: Style,
    pub ok: Style,
    pub failure: Style,
    pub caution: Style,
    pub accent: Style,
    /// Field labels such as `Type:` and `Metrics:`
    pub label: Style,
    pub faint: Style,
    pub prompt: Style,
    pub score: Style,
}

impl Theme {
    /// Colors only on a terminal, and never when `NO_COLOR` is set
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::new(!no_color && console::Term::stdout().is_term())
    }

    pub fn new(colored: bool) -> Self {
        let paint = |style: Style| if colored { style } else { Style::new() };
        Self {
            heading: paint(Style::new().cyan().bold()),
            ok: paint(Style::new().green().bold()),
            failure: paint(Style::new().red().bold()),
            caution: paint(Style::new().yellow().bold()),
            accent: paint(Style::new().magenta()),
            label: paint(Style::new().white().dimmed()),
            faint: paint(Style::new().bright_black()),
            prompt: paint(Style::new().blue().bold()),
            score: paint(Style::new().yellow()),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_adds_no_escapes() {
        let plain = Theme::new(false);
        assert_eq!("boom".style(plain.failure).to_string(), "boom");
        assert_ne!("boom".style(Theme::new(true).failure).to_string(), "boom");
    }
}
