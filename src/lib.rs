//! # Materialized cursors
//!
//! Server side cursors let a client fetch the result set of a query in batches of a size it
//! chooses with each round trip. The cursors of this crate are insensitive: the statement is
//! executed once and its whole result set is materialized into a temporary table. Fetching reads
//! from that table, so the query is never rerun and none of the tables it read from stay locked.
//!
//! [`open_cursor`] executes a statement with a [`MaterializingSink`] standing in for its result.
//! The sink inserts every row into a temporary table and hands the table to a
//! [`MaterializedCursor`], which sends the rows to the original result as they are fetched.
//!
//! ```rust
//! use materialized_cursor::{
//!     open_cursor, CursorOptions, DataType, Error, FetchOutcome, Item, PassthroughSink,
//!     QueryExpression, ServerSideCursor, Session, SqlCommand, Statement, Value, ValuesEngine,
//! };
//!
//! fn main() -> Result<(), Error> {
//!     let mut session = Session::default();
//!     let mut engine = ValuesEngine::new();
//!     let query = QueryExpression::new(
//!         vec![Item::column("shop", "orders", "id", DataType::BigInt)],
//!         vec![vec![Value::Int(1)], vec![Value::Int(2)], vec![Value::Int(3)]],
//!     );
//!     let mut statement = Statement::new(SqlCommand::Select(query));
//!
//!     let cursor = open_cursor(
//!         &mut session,
//!         &mut engine,
//!         &mut statement,
//!         PassthroughSink::new(),
//!         &CursorOptions::default(),
//!     )?
//!     .expect("SELECT statements produce a result set");
//!
//!     assert_eq!(FetchOutcome::Continuing { rows: 2 }, cursor.fetch(&mut session, 2)?);
//!     assert_eq!(FetchOutcome::Exhausted { rows: 1 }, cursor.fetch(&mut session, 2)?);
//!     assert!(!cursor.is_open());
//!     Ok(())
//! }
//! ```

mod arena;
mod cursor;
mod engine;
mod error;
mod execute;
mod item;
mod materialize;
mod memory_table;
mod protocol;
mod result_sink;
mod session;
mod statement;

pub mod handles;

pub use self::{
    arena::{ArenaId, ArenaScope, MemRoot},
    cursor::{CursorOptions, FetchOutcome, LastRowReport, MaterializedCursor, ServerSideCursor},
    engine::{ExecutionEngine, ValuesEngine},
    error::Error,
    execute::open_cursor,
    item::{DataType, Item, Nullable, Row, SendField, Value},
    materialize::MaterializingSink,
    memory_table::{MemoryTable, MemoryTableFactory},
    protocol::{Packet, PassthroughSink},
    result_sink::{QueryShape, ResultSink, SendFlags},
    session::{Session, StatementDigest, StatementLocker},
    statement::{QueryBlock, QueryExpression, SqlCommand, Statement},
};
