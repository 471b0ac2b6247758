//! Memory contexts with a lifetime independent of a single statement execution.
//!
//! Two contexts are in play while a cursor is opened. The transient context of the statement,
//! which is recycled after each execution, and the private context of the cursor, which lives
//! until the cursor is destroyed. Everything `fetch` relies upon after the statement has finished
//! must be attributed to the cursor context. [`crate::Session::use_arena`] makes a context the
//! active one for the lifetime of the returned [`ArenaScope`] and switches back on every exit
//! path.

use std::ops::{Deref, DerefMut};

use crate::Session;

/// Identifies a [`MemRoot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaId(pub(crate) u32);

/// Accounts for the allocations attributed to one memory context. Objects allocated in a context
/// are freed together when the context is cleared.
#[derive(Debug)]
pub struct MemRoot {
    id: ArenaId,
    allocated_bytes: usize,
    num_allocations: usize,
}

impl MemRoot {
    pub(crate) fn new(id: ArenaId) -> Self {
        Self {
            id,
            allocated_bytes: 0,
            num_allocations: 0,
        }
    }

    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Copies `text` into this context.
    pub fn strdup(&mut self, text: &str) -> String {
        self.allocated_bytes += text.len();
        self.num_allocations += 1;
        text.to_owned()
    }

    /// Bytes attributed to this context since it has last been cleared.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes
    }

    pub fn num_allocations(&self) -> usize {
        self.num_allocations
    }

    /// Frees everything allocated in this context. The context itself can be used again.
    pub fn clear_for_reuse(&mut self) {
        self.allocated_bytes = 0;
        self.num_allocations = 0;
    }
}

/// Keeps a memory context active on a session. The previously active context is restored when
/// the scope is dropped. Dereferences to the [`Session`], so the session can be used as usual
/// within the scope.
pub struct ArenaScope<'s> {
    session: &'s mut Session,
    saved: ArenaId,
}

impl<'s> ArenaScope<'s> {
    pub(crate) fn new(session: &'s mut Session, saved: ArenaId) -> Self {
        Self { session, saved }
    }
}

impl Deref for ArenaScope<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for ArenaScope<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for ArenaScope<'_> {
    fn drop(&mut self) {
        self.session.restore_arena(self.saved);
    }
}
