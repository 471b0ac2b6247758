//! Provides the narrow interfaces this crate consumes from the storage layer.
//!
//! Two decisions are already baked into this module:
//!
//! * Treat handler errors by logging them with `log` before they are converted into [`crate::Error`].
//! * The temporary table owns its storage handler. Scans are only ever started through the table.

mod diagnostics;
mod ha_result;
mod logging;
mod scan;
mod server_status;
mod tmp_table;

pub use {
    diagnostics::Diagnostics,
    ha_result::{HaResult, HandlerError},
    logging::log_handler_error,
    scan::ScanHandle,
    server_status::ServerStatus,
    tmp_table::{HaExtra, TmpTable, TmpTableFactory, TmpTableOptions},
};
