use log::debug;

use crate::{
    Error, QueryExpression, QueryShape, ResultSink, Row, SendFlags, Session, SqlCommand,
};

/// Executes statements, writing the result set into a [`ResultSink`].
pub trait ExecutionEngine {
    /// Executes `command`, sending its result set to `result`.
    ///
    /// # Parameters
    ///
    /// * `prepare_result`: `true` if [`ResultSink::prepare`] must be called before the statement
    ///   is executed. `false` if the result has already been prepared together with the
    ///   statement.
    fn execute(
        &mut self,
        session: &mut Session,
        command: &SqlCommand,
        result: &mut dyn ResultSink,
        prepare_result: bool,
    ) -> Result<(), Error>;
}

impl<T> ExecutionEngine for &mut T
where
    T: ExecutionEngine + ?Sized,
{
    fn execute(
        &mut self,
        session: &mut Session,
        command: &SqlCommand,
        result: &mut dyn ResultSink,
        prepare_result: bool,
    ) -> Result<(), Error> {
        (**self).execute(session, command, result, prepare_result)
    }
}

/// Executes statements over rows which are known in advance. Rows which the engine writes to the
/// client directly, bypassing the result, are collected in [`Self::direct_output`].
#[derive(Debug, Default)]
pub struct ValuesEngine {
    direct_output: Vec<Row>,
    executions: usize,
    instrumented_executions: usize,
    rows_inserted: usize,
}

impl ValuesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows sent to the client without passing through the result of a statement.
    pub fn direct_output(&self) -> &[Row] {
        &self.direct_output
    }

    /// Number of statements executed.
    pub fn executions(&self) -> usize {
        self.executions
    }

    /// Number of statements executed while statement instrumentation has been active.
    pub fn instrumented_executions(&self) -> usize {
        self.instrumented_executions
    }

    pub fn rows_inserted(&self) -> usize {
        self.rows_inserted
    }

    fn select(
        &mut self,
        session: &mut Session,
        query: &QueryExpression,
        result: &mut dyn ResultSink,
        prepare_result: bool,
    ) -> Result<(), Error> {
        if query.introspective && result.check_simple_select() {
            debug!("Answering introspective query directly.");
            self.direct_output
                .extend(query.blocks.iter().flat_map(|block| block.rows.iter().cloned()));
            return Ok(());
        }

        // Resolving the column names allocates in the statement arena
        for column in &query.columns {
            session.statement_arena().strdup(&column.name);
        }

        if prepare_result {
            let shape = match query.blocks.len() {
                0 | 1 => QueryShape::Select,
                branches => QueryShape::SetOperation { branches },
            };
            result.prepare(session, &query.columns, &shape)?;
        }

        for (block_index, block) in query.blocks.iter().enumerate() {
            result.start_execution(session)?;
            if block_index == 0 {
                result.send_result_set_metadata(
                    session,
                    &query.columns,
                    SendFlags::NUM_ROWS | SendFlags::EOF,
                )?;
            }
            for (row_index, row) in block.rows.iter().enumerate() {
                if block.fail_at == Some(row_index) {
                    return Err(Error::Execution {
                        reason: format!(
                            "Query block {block_index} failed producing row {row_index}."
                        ),
                    });
                }
                result.send_data(session, &query.columns, row)?;
            }
        }
        result.send_eof(session)?;
        result.cleanup(session);
        Ok(())
    }
}

impl ExecutionEngine for ValuesEngine {
    fn execute(
        &mut self,
        session: &mut Session,
        command: &SqlCommand,
        result: &mut dyn ResultSink,
        prepare_result: bool,
    ) -> Result<(), Error> {
        self.executions += 1;
        if session.digest().is_some() || session.statement_instrumentation().is_some() {
            self.instrumented_executions += 1;
        }
        match command {
            SqlCommand::Select(query) => self.select(session, query, result, prepare_result),
            SqlCommand::Show { rows } => {
                self.direct_output.extend(rows.iter().cloned());
                Ok(())
            }
            SqlCommand::Insert { table, rows } => {
                debug!("Inserting {} rows into '{table}'.", rows.len());
                self.rows_inserted += rows.len();
                Ok(())
            }
            SqlCommand::Ddl { text } => {
                debug!("Executing '{text}'.");
                Ok(())
            }
        }
    }
}
