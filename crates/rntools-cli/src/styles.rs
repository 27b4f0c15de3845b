use anstyle::{AnsiColor, Color, Style};
use clap::builder::Styles;

const fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

pub const HEADER: Style = fg(AnsiColor::Green).bold();
pub const LITERAL: Style = fg(AnsiColor::Cyan);

/// Prefix of lines echoed from an output channel.
pub const CHANNEL: Style = fg(AnsiColor::Blue).bold();
pub const WARNING: Style = fg(AnsiColor::Yellow).bold();
pub const ERROR: Style = fg(AnsiColor::Red).bold();

pub fn get_clap_styles() -> Styles {
    Styles::styled()
        .header(HEADER)
        .usage(HEADER)
        .literal(LITERAL)
        .placeholder(LITERAL)
        .error(ERROR)
        .invalid(WARNING)
        .valid(LITERAL)
}

/// Wraps `text` in `style`'s escape codes.
pub fn paint(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
