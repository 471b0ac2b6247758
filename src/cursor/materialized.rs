use log::{debug, trace};

use crate::{
    Error, Item, MemRoot, QueryShape, ResultSink, Row, SendFlags, Session,
    handles::{ServerStatus, TmpTable},
};

use super::{FetchOutcome, LastRowReport, ServerSideCursor};

/// A cursor over a result set which has been materialized into a temporary table. The statement
/// producing the result set has finished executing before the cursor is opened, so fetching rows
/// neither reruns the query nor holds on to any of the tables it has been reading.
///
/// Usually created by [`crate::open_cursor`] and borrowed from the statement it has been opened
/// for.
pub struct MaterializedCursor<R> {
    /// Receives the metadata and the fetched rows.
    result: R,
    /// Holds the result set. Owned for the whole lifetime of the cursor. Its storage is released
    /// when the cursor is closed, its metadata when the cursor is dropped.
    table: Box<dyn TmpTable>,
    /// Columns sent to the client. These are the columns of the temporary table, carrying the
    /// identity of the columns of the original statement. Empty until the metadata has been sent.
    item_list: Vec<Item>,
    /// Private memory context of the cursor. Must outlive the execution of the statement.
    mem_root: MemRoot,
    fetch_limit: u64,
    fetch_count: u64,
    is_rnd_inited: bool,
    /// Row read from the table but not sent yet. Only used with [`LastRowReport::WithFinalBatch`].
    look_ahead: Option<Row>,
    last_row: LastRowReport,
}

impl<R> MaterializedCursor<R> {
    pub(crate) fn new(
        result: R,
        table: Box<dyn TmpTable>,
        mem_root: MemRoot,
        last_row: LastRowReport,
    ) -> Self {
        Self {
            result,
            table,
            item_list: Vec::new(),
            mem_root,
            fetch_limit: 0,
            fetch_count: 0,
            is_rnd_inited: false,
            look_ahead: None,
            last_row,
        }
    }

    /// Number of rows sent to the client since the cursor has been opened.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    /// Sum of the batch sizes requested since the cursor has been opened.
    pub fn fetch_limit(&self) -> u64 {
        self.fetch_limit
    }

    /// Columns as they are described to the client.
    pub fn item_list(&self) -> &[Item] {
        &self.item_list
    }

    pub fn mem_root(&self) -> &MemRoot {
        &self.mem_root
    }

    /// The temporary table holding the result set.
    pub fn table(&self) -> &dyn TmpTable {
        self.table.as_ref()
    }

    pub(crate) fn table_mut(&mut self) -> &mut dyn TmpTable {
        self.table.as_mut()
    }

    /// Result the rows are sent to.
    pub fn result(&self) -> &R {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut R {
        &mut self.result
    }

    /// Destroys the cursor together with its temporary table, handing back the result.
    pub fn into_result(self) -> R {
        self.result
    }

    /// Reads the next row from the table. `None` after the last row.
    fn read_row(&mut self) -> Result<Option<Row>, Error> {
        if let Some(row) = self.look_ahead.take() {
            return Ok(Some(row));
        }
        let handler = self.table.handler().ok_or(Error::CursorNotOpen)?;
        handler.next_row().into_result_option(&*handler)
    }
}

impl<R> MaterializedCursor<R>
where
    R: ResultSink,
{
    /// Sends the metadata of the result set to the client. The columns of the temporary table
    /// describe the table itself, so the identity of the `columns` of the original statement is
    /// copied onto them first. This happens only once, the column list stays valid after the
    /// statement has been executed.
    pub fn send_result_set_metadata(
        &mut self,
        session: &mut Session,
        columns: &[Item],
    ) -> Result<(), Error> {
        let mut session = session.use_arena(self.mem_root.id());
        if self.item_list.is_empty() {
            self.table.fill_item_list(&mut self.item_list)?;
            if self.item_list.len() != columns.len() {
                let found = self.item_list.len();
                self.item_list.clear();
                return Err(Error::ColumnCountMismatch {
                    expected: columns.len(),
                    found,
                });
            }
            for (dst, org) in self.item_list.iter_mut().zip(columns) {
                let field = org.make_field();
                dst.name = self.mem_root.strdup(&field.col_name);
                dst.org_name = self.mem_root.strdup(&field.org_col_name);
                dst.db_name = self.mem_root.strdup(&field.db_name);
                dst.table_name = self.mem_root.strdup(&field.table_name);
                dst.org_table_name = self.mem_root.strdup(&field.org_table_name);
            }
        }
        self.result
            .send_result_set_metadata(&mut session, &self.item_list, SendFlags::NUM_ROWS)
    }

    /// Prepares the result for the columns of the cursor and starts the scan.
    fn start_scan(&mut self, session: &mut Session) -> Result<(), Error> {
        self.result
            .prepare(session, &self.item_list, &QueryShape::Cursor)?;
        let handler = self.table.handler().ok_or(Error::CursorNotOpen)?;
        handler.init_sequential_scan(true).into_result(&*handler)?;
        self.is_rnd_inited = true;
        Ok(())
    }

    /// Sends rows until the batch is satisfied or the table is exhausted. Returns the number of
    /// rows sent and whether the table has been exhausted.
    fn send_batch(
        &mut self,
        session: &mut Session,
        num_rows: u64,
    ) -> Result<(u64, bool), Interruption> {
        let mut rows = 0;
        loop {
            if self.fetch_count >= self.fetch_limit {
                let more_rows = match self.last_row {
                    LastRowReport::SeparateRoundTrip => true,
                    // Nothing is read ahead for an empty batch. The client did not ask for rows.
                    LastRowReport::WithFinalBatch if num_rows == 0 => true,
                    LastRowReport::WithFinalBatch => {
                        self.look_ahead = self.read_row().map_err(Interruption::Scan)?;
                        self.look_ahead.is_some()
                    }
                };
                return Ok((rows, !more_rows));
            }
            let Some(row) = self.read_row().map_err(Interruption::Scan)? else {
                return Ok((rows, true));
            };
            self.result
                .send_data(session, &self.item_list, &row)
                .map_err(Interruption::Delivery)?;
            self.fetch_count += 1;
            rows += 1;
        }
    }
}

/// Why a batch could not be completed.
enum Interruption {
    /// Reading from the temporary table failed.
    Scan(Error),
    /// The result did not accept a row.
    Delivery(Error),
}

impl<R> ServerSideCursor for MaterializedCursor<R>
where
    R: ResultSink,
{
    fn is_open(&self) -> bool {
        self.table.has_storage_handler()
    }

    fn open(&mut self, session: &mut Session) -> Result<(), Error> {
        session.server_status.remove(ServerStatus::CURSOR_STATE);
        let started = {
            let mut session = session.use_arena(self.mem_root.id());
            self.start_scan(&mut session)
        };
        self.fetch_limit = 0;
        self.fetch_count = 0;
        self.look_ahead = None;

        // Commit or roll back the metadata sent to the client.
        match started {
            Ok(()) => {
                session.server_status.insert(ServerStatus::CURSOR_EXISTS);
                self.result.send_eof(session)?;
                debug!(
                    "Opened materialized cursor over {} columns.",
                    self.item_list.len()
                );
                Ok(())
            }
            Err(error) => {
                self.result.abort_result_set(session);
                Err(error)
            }
        }
    }

    fn fetch(&mut self, session: &mut Session, num_rows: u64) -> Result<FetchOutcome, Error> {
        if !self.is_open() {
            return Err(Error::CursorNotOpen);
        }
        session.server_status.remove(ServerStatus::CURSOR_STATE);
        self.result.begin_dataset();
        self.fetch_limit = self.fetch_limit.saturating_add(num_rows);

        let (rows, exhausted) = match self.send_batch(session, num_rows) {
            Ok(batch) => batch,
            // A failed delivery leaves the cursor open
            Err(Interruption::Delivery(error)) => return Err(error),
            Err(Interruption::Scan(error)) => {
                self.close();
                return Err(error);
            }
        };

        #[cfg(feature = "structured_logging")]
        trace!(
            rows = rows,
            fetch_count = self.fetch_count,
            fetch_limit = self.fetch_limit;
            "Fetched batch from materialized cursor."
        );
        #[cfg(not(feature = "structured_logging"))]
        trace!(
            "Fetched batch of {rows} rows from materialized cursor. Fetch count: {}, fetch limit: {}",
            self.fetch_count,
            self.fetch_limit
        );

        if exhausted {
            session.server_status.insert(ServerStatus::LAST_ROW_SENT);
            let eof = self.result.send_eof(session);
            self.close();
            eof?;
            debug!(
                "Materialized cursor exhausted after {} rows.",
                self.fetch_count
            );
            Ok(FetchOutcome::Exhausted { rows })
        } else {
            session.server_status.insert(ServerStatus::CURSOR_EXISTS);
            self.result.send_eof(session)?;
            Ok(FetchOutcome::Continuing { rows })
        }
    }

    fn close(&mut self) {
        if self.is_rnd_inited {
            if let Some(handler) = self.table.handler() {
                // A failure to end the scan has already been logged. There is nothing else left
                // to do about it.
                let _ = handler.end_scan().into_result(&*handler);
            }
            self.is_rnd_inited = false;
        }
        let was_open = self.is_open();
        self.look_ahead = None;
        self.table.close();
        self.item_list.clear();
        self.mem_root.clear_for_reuse();
        if was_open {
            debug!("Closed materialized cursor.");
        }
    }
}
