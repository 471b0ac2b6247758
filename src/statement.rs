use crate::{Item, MaterializedCursor, MaterializingSink, Row};

/// A statement as it is handed to the execution engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlCommand {
    /// A query producing a result set. Possibly a set operation over several query blocks.
    Select(QueryExpression),
    /// Introspection answered by the engine itself (e.g. `SHOW STATUS`). Writes directly to the
    /// client, bypassing the result of the statement.
    Show { rows: Vec<Row> },
    /// Insert `rows` into `table`. Does not produce a result set.
    Insert { table: String, rows: Vec<Row> },
    /// Data definition, e.g. `CREATE TABLE`.
    Ddl { text: String },
}

impl SqlCommand {
    /// `true` for data manipulation statements. Only these may be executed with a cursor.
    pub fn is_dml(&self) -> bool {
        !matches!(self, SqlCommand::Ddl { .. })
    }

    /// `true` if the statement produces a row stream a cursor can be opened for.
    pub fn may_use_cursor(&self) -> bool {
        matches!(self, SqlCommand::Select(_) | SqlCommand::Show { .. })
    }
}

/// The query of a `SELECT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpression {
    /// Output columns. Shared by all query blocks.
    pub columns: Vec<Item>,
    /// More than one block is a set operation, e.g. `UNION ALL`.
    pub blocks: Vec<QueryBlock>,
    /// A trivial query about the server itself (e.g. `SELECT @@version`). The engine answers these
    /// directly unless the result forbids it.
    pub introspective: bool,
}

impl QueryExpression {
    /// A query with a single block.
    pub fn new(columns: Vec<Item>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            blocks: vec![QueryBlock::new(rows)],
            introspective: false,
        }
    }

    /// Adds another block, turning the query into a set operation.
    pub fn union_all(mut self, rows: Vec<Row>) -> Self {
        self.blocks.push(QueryBlock::new(rows));
        self
    }
}

/// Rows produced by one query block.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBlock {
    pub rows: Vec<Row>,
    /// Execution fails instead of producing the row with this index.
    pub fail_at: Option<usize>,
}

impl QueryBlock {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            fail_at: None,
        }
    }
}

/// A statement which may be executed with a cursor. Either executed once, or prepared and then
/// executed repeatedly. A prepared statement keeps the [`MaterializingSink`] of its first cursor
/// and reuses it for every following execution.
pub struct Statement<R> {
    pub(crate) command: SqlCommand,
    prepared: bool,
    /// The result of the statement has been attached after the statement has been prepared, so
    /// it must be prepared by each execution.
    pub(crate) lazy_result: bool,
    pub(crate) query_result: Option<MaterializingSink<R>>,
}

impl<R> Statement<R> {
    /// A statement which is not prepared.
    pub fn new(command: SqlCommand) -> Self {
        Self {
            command,
            prepared: false,
            lazy_result: false,
            query_result: None,
        }
    }

    /// Marks the statement as prepared. From now on the result of the statement is kept between
    /// executions.
    pub fn prepare(&mut self) {
        self.prepared = true;
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn command(&self) -> &SqlCommand {
        &self.command
    }

    /// `true` if the execution engine must call `prepare` on the result of the statement.
    pub fn needs_result_prepare(&self) -> bool {
        !self.prepared || self.lazy_result
    }

    /// The sink materializing the result set of the last execution with a cursor.
    pub fn query_result(&self) -> Option<&MaterializingSink<R>> {
        self.query_result.as_ref()
    }

    /// Cursor opened by the last execution, if any.
    pub fn cursor(&self) -> Option<&MaterializedCursor<R>> {
        self.query_result.as_ref()?.materialized_cursor()
    }

    pub fn cursor_mut(&mut self) -> Option<&mut MaterializedCursor<R>> {
        self.query_result.as_mut()?.materialized_cursor_mut()
    }
}
