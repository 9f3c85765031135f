//! Character display adapter.
//!
//! Fire-and-forget: the processor forwards `lcd` sub-commands and mirrors
//! authenticated records here, and never looks at a result. The real
//! panel driver lives outside this program; deployments without one run
//! the null or logging implementation.

use crate::record::User;

pub trait Display {
    fn clear(&mut self);
    fn print(&mut self, text: &str);
    fn next_line(&mut self);
    fn set_blink(&mut self, on: bool);
    fn set_cursor(&mut self, on: bool);
}

/// Discards everything.
pub struct NullDisplay;

impl Display for NullDisplay {
    fn clear(&mut self) {}
    fn print(&mut self, _text: &str) {}
    fn next_line(&mut self) {}
    fn set_blink(&mut self, _on: bool) {}
    fn set_cursor(&mut self, _on: bool) {}
}

/// Emits each command as a tracing debug event. Stand-in for deployments
/// where no panel is wired up.
pub struct LogDisplay;

impl Display for LogDisplay {
    fn clear(&mut self) {
        tracing::debug!(target: "idcon::display", "clear");
    }

    fn print(&mut self, text: &str) {
        tracing::debug!(target: "idcon::display", text, "print");
    }

    fn next_line(&mut self) {
        tracing::debug!(target: "idcon::display", "next line");
    }

    fn set_blink(&mut self, on: bool) {
        tracing::debug!(target: "idcon::display", on, "blink");
    }

    fn set_cursor(&mut self, on: bool) {
        tracing::debug!(target: "idcon::display", on, "cursor");
    }
}

/// Renders an authenticated record: ID on the first line, payload on the
/// second. The password never reaches the display.
pub fn mirror_user(display: &mut dyn Display, user: &User) {
    display.clear();
    display.print(&format!("ID: {}", user.id()));
    display.next_line();
    display.print(&user.data_text());
}
