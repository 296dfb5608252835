//! Plain-text rendering of the board for a terminal.

use std::fmt::Write as _;

use orderboard_core::order::OrderRecord;

use crate::api::BoardSnapshot;

/// ANSI sequence that clears the screen and homes the cursor.
pub const CLEAR: &str = "\x1b[2J\x1b[H";

/// Terminal bell, rung when a new order becomes ready.
pub const BELL: &str = "\x07";

/// How many rows of each list to draw.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub preparing_rows: usize,
    pub ready_rows: usize,
}

/// Render a full screen.
///
/// The most recently ready order is highlighted at the top of the ready
/// section, followed by up to `ready_rows` other ready orders. `cue` prepends
/// the terminal bell.
pub fn render_board(snapshot: &BoardSnapshot, layout: Layout, cue: bool) -> String {
    let mut out = String::new();
    if cue {
        out.push_str(BELL);
    }
    out.push_str(CLEAR);

    let highlighted = snapshot
        .latest_ready
        .as_ref()
        .or_else(|| snapshot.ready.first());

    out.push_str("READY\n");
    match highlighted {
        Some(order) => {
            let _ = writeln!(out, "  >> {}", label(order));
            let others = snapshot
                .ready
                .iter()
                .filter(|o| o.id != order.id)
                .take(layout.ready_rows);
            for order in others {
                let _ = writeln!(out, "     {}", label(order));
            }
        }
        None => out.push_str("     -\n"),
    }

    out.push_str("\nPREPARING\n");
    if snapshot.preparing.is_empty() {
        out.push_str("     -\n");
    }
    for order in snapshot.preparing.iter().take(layout.preparing_rows) {
        let _ = writeln!(out, "     {}", label(order));
    }

    out
}

/// Render the cleared screen shown after an idle reset.
pub fn render_cleared() -> String {
    format!("{CLEAR}READY\n     -\n\nPREPARING\n     -\n")
}

/// Customer name followed by the ticket, or just the ticket.
fn label(order: &OrderRecord) -> String {
    if order.display_label == order.ticket {
        order.ticket.clone()
    } else {
        format!("{} ({})", order.display_label, order.ticket)
    }
}
