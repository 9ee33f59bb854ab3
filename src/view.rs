//! Rendering of todos and routines for the terminal and for HTML export.
//!
//! Item text is free-form user input. Everything that reaches a terminal goes
//! through [`sanitize_for_terminal`], and everything that reaches a document
//! goes through [`escape_html`].
use std::fmt::Write;

use console::style;

use crate::{RoutineItem, TodoItem};

pub const EMPTY_ACTIVE_MESSAGE: &str = "No active tasks";
pub const EMPTY_DONE_MESSAGE: &str = "No completed tasks";
pub const EMPTY_ROUTINE_MESSAGE: &str = "No routines";

/// Drops control characters so stored text cannot inject terminal escape
/// sequences. Tabs become spaces.
pub fn sanitize_for_terminal(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// One line per active task, or the empty message.
pub fn render_active(items: &[&TodoItem]) -> String {
    if items.is_empty() {
        return format!("{}\n", style(EMPTY_ACTIVE_MESSAGE).dim());
    }

    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "[ ] {}  {}",
            style(item.id).dim(),
            sanitize_for_terminal(&item.text)
        );
    }
    out
}

/// One line per completed task with its completion time, or the empty
/// message.
pub fn render_done(items: &[&TodoItem]) -> String {
    if items.is_empty() {
        return format!("{}\n", style(EMPTY_DONE_MESSAGE).dim());
    }

    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "[x] {}  {}  {}",
            style(item.id).dim(),
            style(sanitize_for_terminal(&item.text)).dim(),
            style(item.done_time.as_deref().unwrap_or("")).cyan()
        );
    }
    out
}

pub fn render_routines(items: &[RoutineItem], last_reset: Option<&str>) -> String {
    let mut out = String::new();
    if items.is_empty() {
        let _ = writeln!(out, "{}", style(EMPTY_ROUTINE_MESSAGE).dim());
    }

    for item in items {
        let mark = if item.checked { "x" } else { " " };
        let _ = writeln!(
            out,
            "[{}] {}  {}",
            mark,
            style(item.id).dim(),
            sanitize_for_terminal(&item.text)
        );
    }

    if let Some(date) = last_reset {
        let _ = writeln!(out, "{}", style(format!("Last reset: {}", date)).dim());
    }
    out
}

/// A standalone HTML page with the active, done and routine lists.
pub fn render_html(
    active: &[&TodoItem],
    done: &[&TodoItem],
    routines: &[RoutineItem],
    last_reset: Option<&str>,
) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>dailydo</title>\n</head>\n<body>\n");

    out.push_str("<h2>Active</h2>\n<ul id=\"active\">\n");
    if active.is_empty() {
        let _ = writeln!(out, "<li class=\"empty-message\">{}</li>", EMPTY_ACTIVE_MESSAGE);
    }
    for item in active {
        let _ = writeln!(
            out,
            "<li class=\"todo-item\" data-id=\"{}\"><span class=\"todo-text\">{}</span></li>",
            item.id,
            escape_html(&item.text)
        );
    }
    out.push_str("</ul>\n");

    out.push_str("<h2>Done</h2>\n<ul id=\"done\">\n");
    if done.is_empty() {
        let _ = writeln!(out, "<li class=\"empty-message\">{}</li>", EMPTY_DONE_MESSAGE);
    }
    for item in done {
        let _ = writeln!(
            out,
            "<li class=\"todo-item done\" data-id=\"{}\"><span class=\"todo-text\">{}</span> <span class=\"done-time\">{}</span></li>",
            item.id,
            escape_html(&item.text),
            escape_html(item.done_time.as_deref().unwrap_or(""))
        );
    }
    out.push_str("</ul>\n");

    out.push_str("<h2>Routines</h2>\n<ul id=\"routines\">\n");
    if routines.is_empty() {
        let _ = writeln!(out, "<li class=\"empty-message\">{}</li>", EMPTY_ROUTINE_MESSAGE);
    }
    for item in routines {
        let _ = writeln!(
            out,
            "<li class=\"routine-item\" data-id=\"{}\"><input type=\"checkbox\" disabled{}> {}</li>",
            item.id,
            if item.checked { " checked" } else { "" },
            escape_html(&item.text)
        );
    }
    out.push_str("</ul>\n");

    if let Some(date) = last_reset {
        let _ = writeln!(
            out,
            "<p class=\"last-reset\">Last reset: {}</p>",
            escape_html(date)
        );
    }

    out.push_str("</body>\n</html>\n");
    out
}
