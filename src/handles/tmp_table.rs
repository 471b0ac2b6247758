use crate::{ArenaId, Error, Item, Row};

use super::{Diagnostics, HaResult, ScanHandle};

/// Options controlling how a temporary table is created.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TmpTableOptions {
    /// Silently skip rows violating a unique (hash) index instead of failing the insert.
    pub ignore_dup_key: bool,
    /// Keep every column of the result in the table, even those the engine would prune because
    /// they are not referenced.
    pub all_columns: bool,
    /// Remove duplicate rows using a hash index over all columns.
    pub distinct: bool,
    /// Upper bound for the number of rows. `None` means the table may grow without bound.
    /// Exceeding the bound fails the insert with [`super::HandlerError::RECORD_FILE_FULL`].
    pub max_rows: Option<usize>,
}

/// Hints passed to the storage handler of a temporary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaExtra {
    /// Inserting a duplicate key is not an error, the row is skipped.
    IgnoreDupKey,
    /// Revert [`HaExtra::IgnoreDupKey`].
    NoIgnoreDupKey,
}

/// An internal temporary table. It is created with metadata only, and must be instantiated before
/// any rows can be written or read. Dropping the table destroys it, including its storage.
pub trait TmpTable: Diagnostics {
    /// Column items describing the columns of the table. The names are those of the temporary
    /// table, not necessarily those of the query the table has been created for.
    fn columns(&self) -> &[Item];

    /// Appends a copy of the column items of this table to `items`.
    fn fill_item_list(&self, items: &mut Vec<Item>) -> Result<(), Error> {
        items.extend(self.columns().iter().cloned());
        Ok(())
    }

    /// `true` if the storage of the table has been instantiated.
    fn is_created(&self) -> bool;

    /// Allocates the physical storage and the storage handler of the table.
    ///
    /// * `arena`: The arena which has been active when the handler has been created. Handler
    ///   owned state must stay valid as long as this arena is alive.
    fn instantiate(&mut self, arena: ArenaId) -> HaResult<()>;

    /// Arena which has been active when the storage has been instantiated. `None` if the table is
    /// not instantiated.
    fn storage_arena(&self) -> Option<ArenaId>;

    /// `true` if the table has a storage handler attached, i.e. it is instantiated and has not
    /// been closed since.
    fn has_storage_handler(&self) -> bool;

    /// Storage handler used to scan the table. `None` if the table is not instantiated.
    fn handler(&mut self) -> Option<&mut dyn ScanHandle>;

    /// Appends a row to the table.
    fn write_row(&mut self, row: Row) -> HaResult<()>;

    /// Passes a hint to the storage handler.
    fn extra(&mut self, operation: HaExtra) -> HaResult<()>;

    /// `true` if rows are de-duplicated with a hash index over all columns.
    fn has_hash_field(&self) -> bool;

    /// Initializes the hash index used for de-duplication.
    fn index_init(&mut self) -> HaResult<()>;

    /// Releases the storage handler and the rows. Metadata stays, the table may be instantiated
    /// again. Calling this on a table without storage is a no-op.
    fn close(&mut self);
}

/// Creates temporary tables. Owned by the [`crate::Session`].
pub trait TmpTableFactory {
    /// Creates the metadata of a temporary table with one column for each item in `columns`. The
    /// table is not instantiated yet.
    fn create(
        &mut self,
        columns: &[Item],
        options: &TmpTableOptions,
    ) -> Result<Box<dyn TmpTable>, Error>;
}
