use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::{OwoColorize, Style};

fn styled(text: &str, style: &Style) -> String {
    text.style(style.clone()).to_string()
}

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, styled(text, &theme().heading));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, dim(label), value);
}

pub fn success(message: &str) {
    println!("{} {}", Icons::CHECK, styled(message, &theme().ok));
}

/// Written to stderr, as is `warn`
pub fn error(message: &str) {
    eprintln!("{} {}", Icons::CROSS, styled(message, &theme().failure));
}

pub fn warn(message: &str) {
    eprintln!("{} {}", Icons::WARN, styled(message, &theme().caution));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", styled(Icons::INFO, &theme().accent), dim(label), value);
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", styled(title, &theme().heading));
}

pub fn dim(text: &str) -> String {
    styled(text, &theme().label)
}

pub fn muted(text: &str) -> String {
    styled(text, &theme().faint)
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", dim(label), value);
}

/// Shell prompt, marked busy while a query is outstanding
pub fn prompt(busy: bool) -> String {
    let marker = if busy { "nlqe (running)" } else { "nlqe" };
    format!("{}> ", styled(marker, &theme().prompt))
}
