#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Plain-text rendering of the view models in `machines_core`.
//!
//! Every function is pure: it takes a model and returns a `String`. Color is
//! opt-in through `Style` so output stays stable in pipes and tests.

use std::fmt::Write as _;

use machines_core::{Button, DetailModel, MachineRow, StatusBadge, StatusColor};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    /// Emit ANSI color escapes.
    pub ansi: bool,
}

impl Style {
    pub const PLAIN: Style = Style { ansi: false };
    pub const ANSI: Style = Style { ansi: true };

    fn paint(self, color: StatusColor, text: &str) -> String {
        if !self.ansi {
            return text.to_string();
        }
        let code = match color {
            StatusColor::Green => "32",
            StatusColor::Red => "31",
            StatusColor::Yellow => "33",
            StatusColor::Gray => "90",
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn dim(self, text: &str) -> String {
        if self.ansi {
            format!("\x1b[2m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

/// `[Free]`, colored by the badge when `style.ansi`.
pub fn render_badge(badge: StatusBadge, style: Style) -> String {
    style.paint(badge.color, &format!("[{}]", badge.label))
}

/// Enabled buttons in brackets, disabled ones in parentheses.
pub fn render_button(button: Button, style: Style) -> String {
    if button.enabled {
        format!("[{}]", button.command)
    } else {
        style.dim(&format!("({})", button.command))
    }
}

pub fn render_detail(model: &DetailModel, style: Style) -> String {
    let m = &model.machine;
    let mut out = String::new();
    let _ = writeln!(out, "Machine {}", m.id);
    let _ = writeln!(out, "  Status:  {}", render_badge(model.badge, style));
    let _ = writeln!(out, "  Voltage: {} V", m.voltage);
    let _ = writeln!(out, "  IP:      {}", m.ip_addr);
    if let Some(p) = m.parking_id {
        let _ = writeln!(out, "  Parking: {p}");
    }
    let buttons: Vec<String> = model
        .panel
        .buttons()
        .iter()
        .map(|b| render_button(*b, style))
        .collect();
    let _ = writeln!(out, "  {}", buttons.join(" "));
    if let Some(e) = &model.error {
        let _ = writeln!(out, "  {}", style.paint(StatusColor::Red, &format!("error: {e}")));
    }
    out
}

const HEADERS: [&str; 4] = ["ID", "STATUS", "VOLTAGE", "IP"];

/// Fixed-width table, one machine per line.
pub fn render_table(rows: &[MachineRow], style: Style) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            [
                r.id.clone(),
                r.badge.label.to_string(),
                format!("{} V", r.voltage),
                r.ip_addr.clone(),
            ]
        })
        .collect();
    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (w, c) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(c.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());
    for (row, r) in cells.iter().zip(rows) {
        let mut line = Vec::with_capacity(4);
        for (i, (c, w)) in row.iter().zip(widths).enumerate() {
            let padded = format!("{c:<w$}");
            // Pad before painting so escapes do not skew the columns.
            line.push(if i == 1 {
                style.paint(r.badge.color, &padded)
            } else {
                padded
            });
        }
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    if rows.is_empty() {
        let _ = writeln!(out, "(no machines)");
    }
    out
}
