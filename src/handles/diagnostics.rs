use super::HandlerError;

/// Report a human readable message for a handler error code. Implemented by anything which may hand
/// out a [`HandlerError`], so the message can carry context only the implementation knows about
/// (e.g. the name of the table).
pub trait Diagnostics {
    /// Formats `code` for diagnostic output. Only used to produce log records and error messages,
    /// it must not change the state of the handle.
    fn print_error(&self, code: HandlerError) -> String {
        format!("Got error {} \"{}\" from storage engine", code.0, code.message())
    }
}
