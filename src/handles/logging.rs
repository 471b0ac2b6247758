use super::{Diagnostics, HandlerError};
use log::{Level, warn};

/// Formats the error `code` using the diagnostics of `handle` and logs the text as a warning.
pub fn log_handler_error(handle: &(impl Diagnostics + ?Sized), code: HandlerError) {
    if log::max_level() < Level::Warn {
        // Early return to safe the work of formatting the message in case we would not log
        // anything.
        return;
    }
    warn!("{}", handle.print_error(code));
}
