//! Test for logging is isolated in its own module to avoid messing with the global settings of
//! other, non-logging related tests.
use log::Level;
use materialized_cursor::{
    CursorOptions, DataType, Item, MemoryTableFactory, PassthroughSink, QueryExpression,
    ServerSideCursor, Session, SqlCommand, Statement, Value, ValuesEngine,
    handles::{Diagnostics, HandlerError, log_handler_error},
    open_cursor,
};

#[test]
fn emit_a_warning_for_a_handler_error() {
    // Given a handle with a custom message
    struct DiagnosticStub;

    impl Diagnostics for DiagnosticStub {
        fn print_error(&self, code: HandlerError) -> String {
            format!("stub failed with {}", code.0)
        }
    }

    testing_logger::setup();

    // When logging an error code of the handle
    log_handler_error(&DiagnosticStub, HandlerError::CRASHED);

    // The message is logged as a warning
    testing_logger::validate(|captured_logs| {
        assert_eq!(captured_logs.len(), 1);
        assert_eq!(captured_logs[0].level, Level::Warn);
        assert_eq!(captured_logs[0].body, "stub failed with 126");
    });
}

#[test]
fn scan_error_during_fetch_is_warned() {
    // Given a cursor over a temporary table, which crashes reading its first row
    let mut session =
        Session::new(MemoryTableFactory::new().fail_scan_at(0, HandlerError::CRASHED));
    let mut engine = ValuesEngine::new();
    let query = QueryExpression::new(
        vec![Item::new("n", DataType::BigInt)],
        vec![vec![Value::Int(1)]],
    );
    let mut statement = Statement::new(SqlCommand::Select(query));
    let cursor = open_cursor(
        &mut session,
        &mut engine,
        &mut statement,
        PassthroughSink::new(),
        &CursorOptions::default(),
    )
    .unwrap()
    .unwrap();
    testing_logger::setup();

    // When fetching from the cursor
    let result = cursor.fetch(&mut session, 1);

    // Then the handler error is logged, naming the temporary table
    assert!(result.is_err());
    testing_logger::validate(|captured_logs| {
        let warnings: Vec<_> = captured_logs
            .iter()
            .filter(|log| log.level == Level::Warn)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].body.starts_with("Got error 126"));
        assert!(warnings[0].body.contains("#sql_mem_"));
    });
}
