use log::debug;

use crate::{
    CursorOptions, Error, ExecutionEngine, MaterializedCursor, MaterializingSink, ResultSink,
    ServerSideCursor, Session, Statement,
};

/// Executes `statement` and materializes its result set, so it can be fetched from the returned
/// cursor in batches. Rows fetched from the cursor are sent to `result`.
///
/// The first time a prepared statement is opened a [`MaterializingSink`] is attached to it. Later
/// executions reuse it, but every execution materializes its result set into a new temporary
/// table. Statements which are not prepared get a new sink each time.
///
/// # Parameters
///
/// * `session`: Session the statement is executed in. Statement instrumentation is suspended for
///   the duration of the execution.
/// * `engine`: Executes the statement.
/// * `statement`: Must be a data manipulation statement which may produce a row stream, e.g. a
///   `SELECT`.
/// * `result`: Receives the metadata now, and the rows once they are fetched.
/// * `options`: Options for the temporary table and the cursor.
///
/// # Return
///
/// The opened cursor, borrowed from `statement`. `None` if the statement has been executed
/// successfully but did not produce a result set which could be materialized. This happens for
/// statements writing directly to the client, e.g. `SHOW STATUS`.
pub fn open_cursor<'s, R>(
    session: &mut Session,
    mut engine: impl ExecutionEngine,
    statement: &'s mut Statement<R>,
    result: R,
    options: &CursorOptions,
) -> Result<Option<&'s mut MaterializedCursor<R>>, Error>
where
    R: ResultSink,
{
    // Only statements producing a row stream may have a cursor assigned
    if !statement.command.is_dml() || !statement.command.may_use_cursor() {
        return Err(Error::WrongArguments {
            context: "with cursor",
        });
    }

    // Statements which are not prepared get a new sink for each execution. Prepared statements
    // keep the sink of their first cursor.
    let prepared = statement.is_prepared();
    match &mut statement.query_result {
        Some(sink) if prepared => {
            sink.set_options(options.clone());
            sink.reset_for_reexecution(result);
        }
        query_result => {
            *query_result = Some(MaterializingSink::new(result, options.clone()));
            // The sink has not been attached during preparation. Should the statement be
            // reused as a prepared one, the sink must be prepared on each execution.
            statement.lazy_result = true;
        }
    }

    let prepare_result = statement.needs_result_prepare();
    let Statement {
        command,
        query_result,
        ..
    } = statement;
    let sink = query_result.as_mut().ok_or(Error::ResultNotPrepared)?;

    let executed = session.without_instrumentation(|session| {
        engine.execute(session, command, &mut *sink, prepare_result)
    });
    session.end_statement();

    if let Err(error) = executed {
        if sink.materialized_cursor().is_some() {
            // Roll back the metadata already sent to the client
            sink.abort_result_set(session);
            sink.discard_cursor();
        }
        return Err(error);
    }

    let Some(cursor) = sink.materialized_cursor_mut() else {
        debug!("Statement executed with cursor did not produce a result set.");
        return Ok(None);
    };
    if let Err(error) = cursor.open(session) {
        sink.discard_cursor();
        return Err(error);
    }
    Ok(sink.materialized_cursor_mut())
}
