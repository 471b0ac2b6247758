use thiserror::Error as ThisError;

use crate::handles::{Diagnostics, HaResult, HandlerError, log_handler_error};

#[derive(Debug, ThisError)]
/// Error type used to indicate a failed cursor operation. Every failure is returned to the
/// immediate caller. Resources (scans, temporary tables) have already been released when the error
/// is returned.
pub enum Error {
    /// A cursor has been requested for a statement which can not produce a row stream, e.g. a DDL
    /// statement. Exclusively emitted by [`crate::open_cursor`] before anything is executed.
    #[error("Incorrect arguments to {context}")]
    WrongArguments {
        /// Describes the usage which has been rejected.
        context: &'static str,
    },
    /// A storage handler call failed with an error code other than end of file.
    #[error("Storage handler call '{function}' failed: {code}")]
    Handler {
        code: HandlerError,
        /// Handler entry point which produced the error code.
        function: &'static str,
    },
    /// The temporary table holding the materialized result set is full. Raised instead of
    /// [`Error::Handler`] if rows are inserted beyond [`crate::handles::TmpTableOptions::max_rows`].
    #[error(
        "The temporary table used to materialize the result set of the cursor is full. It can hold \
        at most {max_rows} rows. Consider fetching the result without a cursor, or raising the \
        limit."
    )]
    TmpTableFull { max_rows: usize },
    /// Creating the metadata of the temporary table failed. Nothing has been materialized.
    #[error("Failed to create temporary table for cursor: {reason}")]
    TmpTableCreation { reason: String },
    /// The result sink rejected metadata, a row or the end of data, e.g. because the connection
    /// to the client is broken.
    #[error("Failed to send result to client: {reason}")]
    Delivery { reason: String },
    /// The execution engine failed to execute the statement.
    #[error("Statement execution failed: {reason}")]
    Execution { reason: String },
    /// `fetch` has been called on a cursor which is not open. Note that a cursor is closed
    /// automatically after its last row has been sent.
    #[error("Attempt to fetch from a cursor which is not open.")]
    CursorNotOpen,
    /// The materializing result has been asked to deliver metadata or rows before it has been
    /// prepared for the current execution.
    #[error("The result of the cursor has not been prepared for this execution.")]
    ResultNotPrepared,
    /// The temporary table does not have one column for each column of the statement.
    #[error(
        "The temporary table of the cursor has {found} columns, but the statement produces \
        {expected} columns."
    )]
    ColumnCountMismatch { expected: usize, found: usize },
}

impl Error {
    /// Replaces a generic [`Error::Handler`] with whatever `f` returns for its code. Other variants
    /// are passed through unchanged.
    fn provide_context_for_handler_error<F>(self, f: F) -> Self
    where
        F: FnOnce(HandlerError, &'static str) -> Error,
    {
        if let Error::Handler { code, function } = self {
            f(code, function)
        } else {
            self
        }
    }
}

/// Lets a call site turn a handler error code into an error specific to what it has been doing.
pub(crate) trait ExtendResult {
    fn provide_context_for_handler_error<F>(self, f: F) -> Self
    where
        F: FnOnce(HandlerError, &'static str) -> Error;
}

impl<T> ExtendResult for Result<T, Error> {
    fn provide_context_for_handler_error<F>(self, f: F) -> Self
    where
        F: FnOnce(HandlerError, &'static str) -> Error,
    {
        self.map_err(|error| error.provide_context_for_handler_error(f))
    }
}

// Conversions live here, so `handles` does not depend on the crate level `Error` type.
impl<T> HaResult<T> {
    /// [`Self::Success`] is mapped to `Ok`. [`Self::Error`] is logged using the diagnostics of
    /// `handle` and mapped to [`Error::Handler`]. Use this if end of file is not expected.
    /// [`Self::EndOfFile`] is treated as an error in that case.
    pub fn into_result(self, handle: &(impl Diagnostics + ?Sized)) -> Result<T, Error> {
        self.into_result_with(handle, None)
    }

    /// Like [`Self::into_result`], but [`HaResult::EndOfFile`] is mapped to `None`, and success is
    /// mapped to `Some`.
    pub fn into_result_option(
        self,
        handle: &(impl Diagnostics + ?Sized),
    ) -> Result<Option<T>, Error> {
        let mapped = match self {
            HaResult::Success(value) => HaResult::Success(Some(value)),
            HaResult::EndOfFile => HaResult::EndOfFile,
            HaResult::Error { code, function } => HaResult::Error { code, function },
        };
        mapped.into_result_with(handle, Some(None))
    }

    /// Most flexible way of converting an `HaResult` to an idiomatic `Result`.
    ///
    /// # Parameters
    ///
    /// * `handle`: Used to format a message for the error code, which is then logged as a warning.
    /// * `end_of_file`: Controls the behaviour for [`HaResult::EndOfFile`]. `None` indicates that
    ///   end of file is not expected and is reported as an error. `Some(value)` would cause
    ///   [`HaResult::EndOfFile`] to be mapped to `Ok(value)`.
    pub fn into_result_with(
        self,
        handle: &(impl Diagnostics + ?Sized),
        end_of_file: Option<T>,
    ) -> Result<T, Error> {
        match self {
            HaResult::Success(value) => Ok(value),
            HaResult::EndOfFile => end_of_file.ok_or(Error::Handler {
                code: HandlerError::END_OF_FILE,
                function: "unknown",
            }),
            HaResult::Error { code, function } => {
                log_handler_error(handle, code);
                Err(Error::Handler { code, function })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::handles::{Diagnostics, HaResult, HandlerError};

    use super::{Error, ExtendResult};

    struct Quiet;

    impl Diagnostics for Quiet {}

    #[test]
    fn end_of_file_is_none_if_expected() {
        let result: HaResult<u32> = HaResult::EndOfFile;
        assert!(matches!(result.into_result_option(&Quiet), Ok(None)));
    }

    #[test]
    fn end_of_file_is_an_error_if_unexpected() {
        let result: HaResult<u32> = HaResult::EndOfFile;
        assert!(matches!(
            result.into_result(&Quiet),
            Err(Error::Handler {
                code: HandlerError::END_OF_FILE,
                ..
            })
        ));
    }

    #[test]
    fn context_replaces_generic_handler_error() {
        let result: Result<(), Error> = HaResult::Error {
            code: HandlerError::RECORD_FILE_FULL,
            function: "write_row",
        }
        .into_result(&Quiet);

        let error = result
            .provide_context_for_handler_error(|code, function| {
                if code == HandlerError::RECORD_FILE_FULL {
                    Error::TmpTableFull { max_rows: 10 }
                } else {
                    Error::Handler { code, function }
                }
            })
            .unwrap_err();

        assert!(matches!(error, Error::TmpTableFull { max_rows: 10 }));
    }
}
