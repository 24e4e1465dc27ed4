//! Nice `dmetcas` output formatting.

use std::fmt;

use log;

const DMETCAS_BANNER_LENGTH: usize = 103;

/// Logs a warning to the `dmetcas-output` logger.
macro_rules! dmetcas_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::warn!(target: "dmetcas-output", $fmt, $($($arg)*)?); }
}

/// Logs a main output line to the `dmetcas-output` logger.
macro_rules! dmetcas_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "dmetcas-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {dmetcas_output, dmetcas_warn};

/// Logs a nicely formatted section title to the `dmetcas-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(DMETCAS_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    dmetcas_output!("┌──{bar}──┐");
    dmetcas_output!("│§ {title:^length$} §│");
    dmetcas_output!("└──{bar}──┘");
}

/// Logs a nicely formatted subtitle to the `dmetcas-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    dmetcas_output!("{}", subtitle);
    dmetcas_output!("{}", bar);
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging `dmetcas` outputs nicely.
pub(crate) trait DmetCasOutput: fmt::Debug + fmt::Display {
    /// Logs display output nicely.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            dmetcas_output!("{line}");
        })
    }

    /// Logs debug output nicely.
    fn log_output_debug(&self) {
        let lines = format!("{self:?}");
        lines.lines().for_each(|line| {
            dmetcas_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> DmetCasOutput for T where T: fmt::Debug + fmt::Display {}
