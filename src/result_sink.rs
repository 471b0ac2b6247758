use std::ops::BitOr;

use crate::{Error, Item, Session, Value};

/// Flags passed along with the result set metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendFlags(pub u32);

impl SendFlags {
    /// Send the number of columns ahead of the column descriptions.
    pub const NUM_ROWS: SendFlags = SendFlags(1);
    /// Terminate the column descriptions with an end of data packet.
    pub const EOF: SendFlags = SendFlags(2);

    pub fn contains(self, other: SendFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SendFlags {
    type Output = SendFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        SendFlags(self.0 | rhs.0)
    }
}

/// Shape of the query a result is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// A single query block.
    Select,
    /// A set operation (e.g. `UNION`) over `branches` query blocks. Each branch starts its
    /// execution separately.
    SetOperation { branches: usize },
    /// Rows are read from the temporary table of an open cursor rather than produced by a query.
    Cursor,
}

/// Receives the output of a statement: metadata, rows and the end of data. Ordinarily this is the
/// network protocol (see [`crate::PassthroughSink`]). During materialization of a cursor the
/// statement output is redirected into a temporary table by [`crate::MaterializingSink`].
///
/// The execution engine calls the methods in this order: [`Self::prepare`] (only if the result
/// has not been prepared before), [`Self::start_execution`] (once per query block),
/// [`Self::send_result_set_metadata`], [`Self::send_data`] for each row and finally
/// [`Self::send_eof`].
pub trait ResultSink {
    /// Called once before the statement is executed the first time. Implementations may validate
    /// the `columns` and set up state depending on them.
    fn prepare(
        &mut self,
        _session: &mut Session,
        _columns: &[Item],
        _shape: &QueryShape,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Called at the start of each query block execution. Set operations may call this several
    /// times for one statement execution.
    fn start_execution(&mut self, _session: &mut Session) -> Result<(), Error> {
        Ok(())
    }

    /// Sends the description of the result set columns.
    fn send_result_set_metadata(
        &mut self,
        session: &mut Session,
        columns: &[Item],
        flags: SendFlags,
    ) -> Result<(), Error>;

    /// Sends one row. An error denotes a delivery fault, e.g. a failed write to the socket.
    fn send_data(
        &mut self,
        session: &mut Session,
        columns: &[Item],
        row: &[Value],
    ) -> Result<(), Error>;

    /// Called before the first row of each batch fetched from a cursor.
    fn begin_dataset(&mut self) {}

    /// Signals the end of the metadata, or of a batch of rows. The status flags of the `session`
    /// are reported to the client.
    fn send_eof(&mut self, session: &mut Session) -> Result<(), Error>;

    /// Rolls back a partially sent result set.
    fn abort_result_set(&mut self, _session: &mut Session) {}

    /// `false` prevents the execution engine from answering trivial statements directly, bypassing
    /// this result.
    fn check_simple_select(&self) -> bool {
        true
    }

    /// Called when the statement is cleaned up after execution.
    fn cleanup(&mut self, _session: &mut Session) {}
}

impl<T> ResultSink for &mut T
where
    T: ResultSink + ?Sized,
{
    fn prepare(
        &mut self,
        session: &mut Session,
        columns: &[Item],
        shape: &QueryShape,
    ) -> Result<(), Error> {
        (**self).prepare(session, columns, shape)
    }

    fn start_execution(&mut self, session: &mut Session) -> Result<(), Error> {
        (**self).start_execution(session)
    }

    fn send_result_set_metadata(
        &mut self,
        session: &mut Session,
        columns: &[Item],
        flags: SendFlags,
    ) -> Result<(), Error> {
        (**self).send_result_set_metadata(session, columns, flags)
    }

    fn send_data(
        &mut self,
        session: &mut Session,
        columns: &[Item],
        row: &[Value],
    ) -> Result<(), Error> {
        (**self).send_data(session, columns, row)
    }

    fn begin_dataset(&mut self) {
        (**self).begin_dataset()
    }

    fn send_eof(&mut self, session: &mut Session) -> Result<(), Error> {
        (**self).send_eof(session)
    }

    fn abort_result_set(&mut self, session: &mut Session) {
        (**self).abort_result_set(session)
    }

    fn check_simple_select(&self) -> bool {
        (**self).check_simple_select()
    }

    fn cleanup(&mut self, session: &mut Session) {
        (**self).cleanup(session)
    }
}
