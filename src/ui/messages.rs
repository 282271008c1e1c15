//! One-line status output for the CLI.
//!
//! Colour is dropped when stdout is not a terminal or `NO_COLOR` is set, so
//! piped output (CSV to stdout, scripts) stays plain.

use crate::utils::colors::{BLUE, BOLD, GREEN, RED, RESET, YELLOW};
use std::fmt;
use std::io::IsTerminal;

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";
const ICON_SYNC: &str = "⇅";

fn styled(use_color: bool, color: &str, icon: &str, msg: impl fmt::Display) -> String {
    if use_color {
        format!("{color}{BOLD}{icon} {RESET}{msg}")
    } else {
        format!("{icon} {msg}")
    }
}

fn stdout_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn stderr_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}", styled(stdout_color(), BLUE, ICON_INFO, msg));
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}", styled(stdout_color(), GREEN, ICON_OK, msg));
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}", styled(stdout_color(), YELLOW, ICON_WARN, msg));
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}", styled(stderr_color(), RED, ICON_ERR, msg));
}

/// Printed after a local write on a linked cache.
pub fn queued(linked: bool) {
    if linked {
        println!(
            "{}",
            styled(stdout_color(), YELLOW, ICON_SYNC, "Queued for sync with the remote store.")
        );
    }
}
