use std::fmt;

/// Error code returned by a storage handler. The numeric values are the ones storage engines have
/// always been using, so they can be forwarded to clients unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerError(pub i32);

impl HandlerError {
    /// Didn't find key on read or update.
    pub const KEY_NOT_FOUND: HandlerError = HandlerError(120);
    /// Duplicate key on write.
    pub const FOUND_DUPP_KEY: HandlerError = HandlerError(121);
    /// Internal error.
    pub const INTERNAL_ERROR: HandlerError = HandlerError(122);
    /// Indexfile is crashed.
    pub const CRASHED: HandlerError = HandlerError(126);
    /// Out of memory.
    pub const OUT_OF_MEM: HandlerError = HandlerError(128);
    /// Command not supported by the handler, e.g. reading a row without initialising a scan.
    pub const WRONG_COMMAND: HandlerError = HandlerError(131);
    /// The table is full.
    pub const RECORD_FILE_FULL: HandlerError = HandlerError(135);
    /// End in next/prev/first/last.
    pub const END_OF_FILE: HandlerError = HandlerError(137);

    /// Short description of the error code.
    pub fn message(self) -> &'static str {
        match self {
            HandlerError::KEY_NOT_FOUND => "Can't find record",
            HandlerError::FOUND_DUPP_KEY => "Duplicate key",
            HandlerError::INTERNAL_ERROR => "Internal (unspecified) error in handler",
            HandlerError::CRASHED => "Table is crashed and last repair failed",
            HandlerError::OUT_OF_MEM => "Out of memory",
            HandlerError::WRONG_COMMAND => "Wrong command sent to the storage engine",
            HandlerError::RECORD_FILE_FULL => "The table is full",
            HandlerError::END_OF_FILE => "No more records (read after end of file)",
            _ => "Unknown handler error",
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.0)
    }
}

/// Result of a storage handler call. Like a handler return code this may hold a value, signal the
/// end of a scan, or an error. It is still the responsibility of the caller to log and convert the
/// error. See [`HaResult::into_result`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum HaResult<T> {
    /// The call succeeded. Holds result.
    Success(T),
    /// A sequential scan has been positioned after the last row. No row has been read.
    EndOfFile,
    /// The handler returned an error code other than end of file.
    Error {
        code: HandlerError,
        /// Name of the handler entry point which failed. This helps interpreting the error code if
        /// it is bubbled all the way up to the end users output, but the context is lost.
        function: &'static str,
    },
}

impl<T> HaResult<T> {
    /// Maps a raw handler return code. `0` is success, [`HandlerError::END_OF_FILE`] is mapped to
    /// [`HaResult::EndOfFile`], everything else is an error.
    pub fn from_code(code: i32, function: &'static str, value: impl FnOnce() -> T) -> Self {
        match HandlerError(code) {
            HandlerError(0) => HaResult::Success(value()),
            HandlerError::END_OF_FILE => HaResult::EndOfFile,
            code => HaResult::Error { code, function },
        }
    }

    /// `True` if variant is [`HaResult::Error`].
    pub fn is_err(&self) -> bool {
        matches!(self, HaResult::Error { .. })
    }
}
