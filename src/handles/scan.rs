use crate::Row;

use super::{Diagnostics, HaResult, HandlerError};

/// Sequential row source over the storage of a table. Usually this is the storage handler of a
/// temporary table and obtained using [`super::TmpTable::handler`].
///
/// A scan is bracketed by [`Self::init_sequential_scan`] and [`Self::end_scan`]. Rows are
/// returned in physical order, which for temporary tables is insertion order.
pub trait ScanHandle: Diagnostics {
    /// Positions the handle before the first row.
    ///
    /// * `read_only`: `true` if the rows are only read, never updated or deleted during the scan.
    fn init_sequential_scan(&mut self, read_only: bool) -> HaResult<()>;

    /// Reads the next row. [`HaResult::EndOfFile`] if the scan has been positioned behind the last
    /// row.
    fn next_row(&mut self) -> HaResult<Row>;

    /// Ends a scan started with [`Self::init_sequential_scan`].
    fn end_scan(&mut self) -> HaResult<()>;
}

impl<T> ScanHandle for &mut T
where
    T: ScanHandle + ?Sized,
{
    fn init_sequential_scan(&mut self, read_only: bool) -> HaResult<()> {
        (**self).init_sequential_scan(read_only)
    }

    fn next_row(&mut self) -> HaResult<Row> {
        (**self).next_row()
    }

    fn end_scan(&mut self) -> HaResult<()> {
        (**self).end_scan()
    }
}

impl<T> Diagnostics for &mut T
where
    T: Diagnostics + ?Sized,
{
    fn print_error(&self, code: HandlerError) -> String {
        (**self).print_error(code)
    }
}
