use std::mem;

use log::debug;

use crate::{
    ArenaId, ArenaScope, Error, Item, MemRoot, MemoryTableFactory,
    handles::{ServerStatus, TmpTable, TmpTableFactory, TmpTableOptions},
};

/// Normalized text of the statement currently executed, accumulated for statement statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatementDigest {
    pub text: String,
}

/// Instrumentation of the statement currently executed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatementLocker {
    pub event_name: String,
}

/// Per connection state the cursor machinery relies upon. A session and everything it owns is only
/// ever driven by one thread at a time.
pub struct Session {
    /// Status flags sent to the client with the next end of data packet.
    pub server_status: ServerStatus,
    /// The currently active memory context.
    mem_root: ArenaId,
    /// Transient context of the statement in execution. Recycled after each execution.
    statement_arena: MemRoot,
    next_arena: u32,
    digest: Option<StatementDigest>,
    statement_instrumentation: Option<StatementLocker>,
    tmp_tables: Box<dyn TmpTableFactory>,
}

impl Session {
    /// A session creating its temporary tables with `tmp_tables`.
    pub fn new(tmp_tables: impl TmpTableFactory + 'static) -> Self {
        let statement_arena = MemRoot::new(ArenaId(0));
        Self {
            server_status: ServerStatus::AUTOCOMMIT,
            mem_root: statement_arena.id(),
            statement_arena,
            next_arena: 1,
            digest: None,
            statement_instrumentation: None,
            tmp_tables: Box::new(tmp_tables),
        }
    }

    /// Memory context new objects are attributed to.
    pub fn current_arena(&self) -> ArenaId {
        self.mem_root
    }

    pub fn statement_arena(&mut self) -> &mut MemRoot {
        &mut self.statement_arena
    }

    /// Allocates a new memory context, e.g. for a cursor which must outlive the current statement.
    pub fn new_mem_root(&mut self) -> MemRoot {
        let id = ArenaId(self.next_arena);
        self.next_arena += 1;
        MemRoot::new(id)
    }

    /// Makes `arena` the active memory context, until the returned scope is dropped.
    pub fn use_arena(&mut self, arena: ArenaId) -> ArenaScope<'_> {
        let saved = mem::replace(&mut self.mem_root, arena);
        ArenaScope::new(self, saved)
    }

    pub(crate) fn restore_arena(&mut self, arena: ArenaId) {
        self.mem_root = arena;
    }

    /// Must be called by the execution engine after a statement has been executed. Frees everything
    /// allocated in the transient statement context.
    pub fn end_statement(&mut self) {
        debug_assert_eq!(self.mem_root, self.statement_arena.id());
        self.statement_arena.clear_for_reuse();
    }

    /// Creates the metadata of a temporary table with the factory of this session.
    pub fn create_tmp_table(
        &mut self,
        columns: &[Item],
        options: &TmpTableOptions,
    ) -> Result<Box<dyn TmpTable>, Error> {
        let table = self.tmp_tables.create(columns, options)?;
        debug!("Created temporary table with {} columns.", columns.len());
        Ok(table)
    }

    /// Attaches instrumentation to the statement which is about to be executed.
    pub fn set_instrumentation(
        &mut self,
        digest: Option<StatementDigest>,
        locker: Option<StatementLocker>,
    ) {
        self.digest = digest;
        self.statement_instrumentation = locker;
    }

    pub fn digest(&self) -> Option<&StatementDigest> {
        self.digest.as_ref()
    }

    pub fn statement_instrumentation(&self) -> Option<&StatementLocker> {
        self.statement_instrumentation.as_ref()
    }

    /// Invokes `f` with digest accumulation and statement instrumentation detached from the
    /// session. Both are restored afterwards, independent of the outcome of `f`.
    pub fn without_instrumentation<T>(&mut self, f: impl FnOnce(&mut Session) -> T) -> T {
        let parent_digest = self.digest.take();
        let parent_locker = self.statement_instrumentation.take();
        let ret = f(self);
        self.digest = parent_digest;
        self.statement_instrumentation = parent_locker;
        ret
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(MemoryTableFactory::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{Session, StatementDigest, StatementLocker};

    #[test]
    fn arena_scope_restores_on_early_return() {
        let mut session = Session::default();
        let statement_arena = session.current_arena();
        let cursor_arena = session.new_mem_root();

        fn fails_in_scope(session: &mut Session, arena: crate::ArenaId) -> Result<(), Error> {
            let scope = session.use_arena(arena);
            assert_eq!(arena, scope.current_arena());
            Err(Error::CursorNotOpen)
        }

        assert!(fails_in_scope(&mut session, cursor_arena.id()).is_err());
        assert_eq!(statement_arena, session.current_arena());
    }

    #[test]
    fn instrumentation_is_restored_after_failure() {
        let mut session = Session::default();
        session.set_instrumentation(
            Some(StatementDigest {
                text: "SELECT ?".to_owned(),
            }),
            Some(StatementLocker {
                event_name: "statement/sql/select".to_owned(),
            }),
        );

        let result: Result<(), Error> = session.without_instrumentation(|session| {
            assert!(session.digest().is_none());
            assert!(session.statement_instrumentation().is_none());
            Err(Error::CursorNotOpen)
        });

        assert!(result.is_err());
        assert_eq!("SELECT ?", session.digest().unwrap().text);
        assert!(session.statement_instrumentation().is_some());
    }
}
