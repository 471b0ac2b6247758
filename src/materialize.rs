use log::debug;

use crate::{
    CursorOptions, Error, Item, MaterializedCursor, QueryShape, ResultSink, SendFlags, Session,
    Value,
    error::ExtendResult,
    handles::{HaExtra, HandlerError, TmpTableOptions},
};

/// Stands in for the result of a statement executed with a cursor. Instead of sending the rows to
/// the client, they are inserted into a temporary table. Once the statement has been prepared the
/// temporary table is owned by a [`MaterializedCursor`], which later sends the rows to the
/// original result `R`.
///
/// The original result is either held by this sink, or by its cursor, never by both.
pub struct MaterializingSink<R> {
    /// Original result, as long as no cursor has been created for it.
    result: Option<R>,
    materialized_cursor: Option<MaterializedCursor<R>>,
    options: CursorOptions,
}

impl<R> MaterializingSink<R> {
    pub fn new(result: R, options: CursorOptions) -> Self {
        Self {
            result: Some(result),
            materialized_cursor: None,
            options,
        }
    }

    /// The original result the rows are sent to, once they are fetched from the cursor.
    pub fn result(&self) -> Option<&R> {
        match &self.materialized_cursor {
            Some(cursor) => Some(cursor.result()),
            None => self.result.as_ref(),
        }
    }

    pub fn result_mut(&mut self) -> Option<&mut R> {
        match &mut self.materialized_cursor {
            Some(cursor) => Some(cursor.result_mut()),
            None => self.result.as_mut(),
        }
    }

    /// Cursor created by the last call to `prepare`, if any.
    pub fn materialized_cursor(&self) -> Option<&MaterializedCursor<R>> {
        self.materialized_cursor.as_ref()
    }

    pub fn materialized_cursor_mut(&mut self) -> Option<&mut MaterializedCursor<R>> {
        self.materialized_cursor.as_mut()
    }

    pub fn options(&self) -> &CursorOptions {
        &self.options
    }

    /// Options applied to cursors created by subsequent calls to `prepare`.
    pub fn set_options(&mut self, options: CursorOptions) {
        self.options = options;
    }

    /// Destroys the cursor and its temporary table, if there is one. The original result is kept.
    pub fn discard_cursor(&mut self) {
        if let Some(cursor) = self.materialized_cursor.take() {
            self.result = Some(cursor.into_result());
            debug!("Discarded materialized cursor.");
        }
    }

    /// Readies the sink for another execution of the statement, sending rows to `result` from now
    /// on. The cursor and the temporary table of the previous execution are destroyed. The next
    /// call to `prepare` creates new ones.
    ///
    /// Returns the result replaced by `result`.
    pub fn reset_for_reexecution(&mut self, result: R) -> Option<R> {
        self.discard_cursor();
        self.result.replace(result)
    }

    fn cursor_mut(&mut self) -> Result<&mut MaterializedCursor<R>, Error> {
        self.materialized_cursor
            .as_mut()
            .ok_or(Error::ResultNotPrepared)
    }
}

impl<R> ResultSink for MaterializingSink<R>
where
    R: ResultSink,
{
    fn prepare(
        &mut self,
        session: &mut Session,
        columns: &[Item],
        shape: &QueryShape,
    ) -> Result<(), Error> {
        self.discard_cursor();
        // The original result still validates the columns
        let result = self.result.as_mut().ok_or(Error::ResultNotPrepared)?;
        result.prepare(session, columns, shape)?;

        // Metadata of the table belongs to the statement. The storage is only created in
        // `start_execution`, using the memory context of the cursor.
        let options = TmpTableOptions {
            ignore_dup_key: true,
            all_columns: true,
            ..self.options.tmp_table.clone()
        };
        let table = session.create_tmp_table(columns, &options)?;
        let mem_root = session.new_mem_root();
        let result = self.result.take().ok_or(Error::ResultNotPrepared)?;
        self.materialized_cursor = Some(MaterializedCursor::new(
            result,
            table,
            mem_root,
            self.options.last_row,
        ));
        Ok(())
    }

    /// Instantiates the temporary table. Set operations call this once for each branch, the table
    /// is only instantiated the first time.
    fn start_execution(&mut self, session: &mut Session) -> Result<(), Error> {
        let cursor = self.cursor_mut()?;
        if cursor.table().is_created() {
            return Ok(());
        }
        // The storage handler must stay valid for subsequent fetches
        let session = session.use_arena(cursor.mem_root().id());
        let table = cursor.table_mut();
        table
            .instantiate(session.current_arena())
            .into_result(&*table)?;
        table.extra(HaExtra::IgnoreDupKey).into_result(&*table)?;
        if table.has_hash_field() {
            table.index_init().into_result(&*table)?;
        }
        debug!("Instantiated temporary table of materialized cursor.");
        Ok(())
    }

    fn send_result_set_metadata(
        &mut self,
        session: &mut Session,
        columns: &[Item],
        _flags: SendFlags,
    ) -> Result<(), Error> {
        self.cursor_mut()?.send_result_set_metadata(session, columns)
    }

    fn send_data(
        &mut self,
        _session: &mut Session,
        _columns: &[Item],
        row: &[Value],
    ) -> Result<(), Error> {
        let max_rows = self.options.tmp_table.max_rows;
        let table = self.cursor_mut()?.table_mut();
        table
            .write_row(row.to_vec())
            .into_result(&*table)
            .provide_context_for_handler_error(|code, function| match (code, max_rows) {
                (HandlerError::RECORD_FILE_FULL, Some(max_rows)) => {
                    Error::TmpTableFull { max_rows }
                }
                _ => Error::Handler { code, function },
            })
    }

    fn send_eof(&mut self, _session: &mut Session) -> Result<(), Error> {
        Ok(())
    }

    /// Rolls back the metadata the cursor has sent to the original result.
    fn abort_result_set(&mut self, session: &mut Session) {
        if let Some(result) = self.result_mut() {
            result.abort_result_set(session)
        }
    }

    /// Never let the execution engine answer a statement without materializing it.
    fn check_simple_select(&self) -> bool {
        false
    }

    /// The temporary table must survive the cleanup of the statement.
    fn cleanup(&mut self, _session: &mut Session) {}
}
