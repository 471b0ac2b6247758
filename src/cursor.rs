mod materialized;

use crate::{Error, Session, handles::TmpTableOptions};

pub use self::materialized::MaterializedCursor;

/// A server side cursor lets a client retrieve a result set incrementally, in batches of a size
/// chosen by the client with every round trip.
///
/// # Example: Draining a cursor
///
/// ```rust
/// use materialized_cursor::{Error, FetchOutcome, ServerSideCursor, Session};
///
/// /// Fetches the remaining rows of an open cursor in batches of 100. Returns the number of rows
/// /// sent to the client.
/// fn drain(session: &mut Session, cursor: &mut impl ServerSideCursor) -> Result<u64, Error> {
///     let mut total = 0;
///     loop {
///         match cursor.fetch(session, 100)? {
///             FetchOutcome::Continuing { rows } => total += rows,
///             FetchOutcome::Exhausted { rows } => return Ok(total + rows),
///         }
///     }
/// }
/// ```
pub trait ServerSideCursor {
    /// `true` if the cursor holds a result set rows can be fetched from.
    fn is_open(&self) -> bool;

    /// Starts reading the result set from its first row. Signals the end of the metadata to the
    /// client, reporting that a cursor exists. On failure the metadata sent so far is rolled back.
    fn open(&mut self, session: &mut Session) -> Result<(), Error>;

    /// Sends up to `num_rows` rows to the client, followed by an end of data packet. The cursor
    /// is closed automatically once its last row has been sent.
    ///
    /// `Err` either denotes a failed delivery, in which case the cursor stays open, or a failed
    /// read from the result set, in which case the cursor has been closed.
    fn fetch(&mut self, session: &mut Session, num_rows: u64) -> Result<FetchOutcome, Error>;

    /// Ends the scan and releases the storage of the result set. Closing a cursor which is not
    /// open has no effect.
    fn close(&mut self);
}

impl<T> ServerSideCursor for &mut T
where
    T: ServerSideCursor + ?Sized,
{
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn open(&mut self, session: &mut Session) -> Result<(), Error> {
        (**self).open(session)
    }

    fn fetch(&mut self, session: &mut Session, num_rows: u64) -> Result<FetchOutcome, Error> {
        (**self).fetch(session, num_rows)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// How a successful call to [`ServerSideCursor::fetch`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The batch has been satisfied and the cursor stays open. The client has been told that a
    /// cursor exists.
    Continuing {
        /// Rows sent with this batch.
        rows: u64,
    },
    /// The last row has been sent and the cursor has been closed. The client has been told that
    /// the last row has been sent.
    Exhausted {
        /// Rows sent with this batch. May be fewer than requested, or even zero.
        rows: u64,
    },
}

impl FetchOutcome {
    /// Number of rows sent with the batch.
    pub fn rows(self) -> u64 {
        match self {
            FetchOutcome::Continuing { rows } | FetchOutcome::Exhausted { rows } => rows,
        }
    }

    pub fn is_exhausted(self) -> bool {
        matches!(self, FetchOutcome::Exhausted { .. })
    }
}

/// Controls when the client learns that the last row of a cursor has been sent.
///
/// The default, [`LastRowReport::WithFinalBatch`], changes the classic wire behaviour: a batch
/// ending exactly on the last row already carries `LAST_ROW_SENT`, where classic servers report
/// `CURSOR_EXISTS` and send `LAST_ROW_SENT` only with the following, empty, fetch. Choose
/// [`LastRowReport::SeparateRoundTrip`] to keep the classic signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastRowReport {
    /// The batch delivering the last row also reports the end of the result set and closes the
    /// cursor. To know whether more rows follow, the cursor reads one row ahead.
    #[default]
    WithFinalBatch,
    /// A batch ending exactly on the last row reports that the cursor still exists. Only the next
    /// fetch, which sends no rows, reports the end of the result set. This costs an extra round
    /// trip, but older clients may rely on it.
    SeparateRoundTrip,
}

/// Options for opening a cursor, see [`crate::open_cursor`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CursorOptions {
    /// Passed to the factory creating the temporary table holding the result set. Ignoring
    /// duplicate keys and materializing all columns is always requested in addition to these.
    pub tmp_table: TmpTableOptions,
    /// When to report that the last row has been sent.
    pub last_row: LastRowReport,
}

#[cfg(test)]
mod tests {
    use super::{CursorOptions, FetchOutcome, LastRowReport};

    #[test]
    fn default_reports_last_row_with_final_batch() {
        let options = CursorOptions::default();
        assert_eq!(LastRowReport::WithFinalBatch, options.last_row);
        assert_eq!(None, options.tmp_table.max_rows);
    }

    #[test]
    fn rows_of_outcome() {
        assert_eq!(3, FetchOutcome::Exhausted { rows: 3 }.rows());
        assert!(!FetchOutcome::Continuing { rows: 2 }.is_exhausted());
    }
}
