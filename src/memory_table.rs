//! Heap based temporary tables, kept entirely in memory.

use std::collections::HashSet;

use log::debug;

use crate::{
    ArenaId, Error, Item, Row,
    handles::{
        Diagnostics, HaExtra, HaResult, HandlerError, ScanHandle, TmpTable, TmpTableFactory,
        TmpTableOptions,
    },
};

/// Failures injected into tables created by a [`MemoryTableFactory`]. Used to emulate crashed or
/// exhausted storage.
#[derive(Debug, Clone, Default)]
struct Faults {
    create: Option<String>,
    instantiate: Option<HandlerError>,
    scan_init: Option<HandlerError>,
    /// Reading the row with this zero based index fails with the given code.
    scan_row: Option<(usize, HandlerError)>,
}

/// Creates [`MemoryTable`]s.
#[derive(Debug, Default)]
pub struct MemoryTableFactory {
    num_created: u32,
    faults: Faults,
}

impl MemoryTableFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creating tables fails with [`Error::TmpTableCreation`].
    pub fn fail_create(mut self, reason: &str) -> Self {
        self.faults.create = Some(reason.to_owned());
        self
    }

    /// Instantiating tables fails with `code`.
    pub fn fail_instantiate(mut self, code: HandlerError) -> Self {
        self.faults.instantiate = Some(code);
        self
    }

    /// Starting a sequential scan fails with `code`.
    pub fn fail_scan_init(mut self, code: HandlerError) -> Self {
        self.faults.scan_init = Some(code);
        self
    }

    /// Reading the row with zero based index `row` fails with `code`.
    pub fn fail_scan_at(mut self, row: usize, code: HandlerError) -> Self {
        self.faults.scan_row = Some((row, code));
        self
    }
}

impl TmpTableFactory for MemoryTableFactory {
    fn create(
        &mut self,
        columns: &[Item],
        options: &TmpTableOptions,
    ) -> Result<Box<dyn TmpTable>, Error> {
        if let Some(reason) = &self.faults.create {
            return Err(Error::TmpTableCreation {
                reason: reason.clone(),
            });
        }
        let name = format!("#sql_mem_{}", self.num_created);
        self.num_created += 1;
        let table = MemoryTable::new(name, columns, options.clone(), self.faults.clone());
        Ok(Box::new(table))
    }
}

/// An internal temporary table holding its rows in memory, in insertion order.
#[derive(Debug)]
pub struct MemoryTable {
    name: String,
    columns: Vec<Item>,
    options: TmpTableOptions,
    faults: Faults,
    /// `Some` between instantiation and close.
    storage: Option<HeapHandler>,
}

impl MemoryTable {
    fn new(name: String, columns: &[Item], options: TmpTableOptions, faults: Faults) -> Self {
        // Columns of a temporary table keep the display name, but lose their origin. They now belong
        // to the temporary table.
        let columns = columns
            .iter()
            .map(|item| Item {
                name: item.name.clone(),
                org_name: String::new(),
                table_name: name.clone(),
                org_table_name: name.clone(),
                db_name: String::new(),
                data_type: item.data_type,
                nullable: item.nullable,
            })
            .collect();
        Self {
            name,
            columns,
            options,
            faults,
            storage: None,
        }
    }
}

impl Diagnostics for MemoryTable {
    fn print_error(&self, code: HandlerError) -> String {
        format!(
            "Got error {} \"{}\" from storage engine for table '{}'",
            code.0,
            code.message(),
            self.name
        )
    }
}

impl TmpTable for MemoryTable {
    fn columns(&self) -> &[Item] {
        &self.columns
    }

    fn is_created(&self) -> bool {
        self.storage.is_some()
    }

    fn instantiate(&mut self, arena: ArenaId) -> HaResult<()> {
        if let Some(code) = self.faults.instantiate {
            return HaResult::Error {
                code,
                function: "instantiate",
            };
        }
        debug_assert!(self.storage.is_none(), "Temporary table instantiated twice.");
        debug!("Instantiating temporary table '{}'.", self.name);
        self.storage = Some(HeapHandler {
            table_name: self.name.clone(),
            rows: Vec::new(),
            position: None,
            arena,
            ignore_dup_key: false,
            hash_index: None,
            max_rows: self.options.max_rows,
            scan_init_fault: self.faults.scan_init,
            scan_row_fault: self.faults.scan_row,
        });
        HaResult::Success(())
    }

    fn storage_arena(&self) -> Option<ArenaId> {
        self.storage.as_ref().map(|storage| storage.arena)
    }

    fn has_storage_handler(&self) -> bool {
        self.storage.is_some()
    }

    fn handler(&mut self) -> Option<&mut dyn ScanHandle> {
        self.storage
            .as_mut()
            .map(|storage| storage as &mut dyn ScanHandle)
    }

    fn write_row(&mut self, row: Row) -> HaResult<()> {
        match &mut self.storage {
            Some(storage) => storage.write_row(row),
            None => HaResult::Error {
                code: HandlerError::WRONG_COMMAND,
                function: "write_row",
            },
        }
    }

    fn extra(&mut self, operation: HaExtra) -> HaResult<()> {
        let Some(storage) = &mut self.storage else {
            return HaResult::Error {
                code: HandlerError::WRONG_COMMAND,
                function: "extra",
            };
        };
        storage.ignore_dup_key = match operation {
            HaExtra::IgnoreDupKey => true,
            HaExtra::NoIgnoreDupKey => false,
        };
        HaResult::Success(())
    }

    fn has_hash_field(&self) -> bool {
        self.options.distinct
    }

    fn index_init(&mut self) -> HaResult<()> {
        match &mut self.storage {
            Some(storage) => {
                storage.hash_index = Some(HashSet::new());
                HaResult::Success(())
            }
            None => HaResult::Error {
                code: HandlerError::WRONG_COMMAND,
                function: "index_init",
            },
        }
    }

    fn close(&mut self) {
        if self.storage.take().is_some() {
            debug!("Closed temporary table '{}'.", self.name);
        }
    }
}

/// Storage handler of a [`MemoryTable`].
#[derive(Debug)]
struct HeapHandler {
    table_name: String,
    rows: Vec<Row>,
    /// Index of the next row to read. `Some` while a scan is active.
    position: Option<usize>,
    arena: ArenaId,
    ignore_dup_key: bool,
    hash_index: Option<HashSet<Row>>,
    max_rows: Option<usize>,
    scan_init_fault: Option<HandlerError>,
    scan_row_fault: Option<(usize, HandlerError)>,
}

impl HeapHandler {
    fn write_row(&mut self, row: Row) -> HaResult<()> {
        if self.hash_index.as_ref().is_some_and(|index| index.contains(&row)) {
            return if self.ignore_dup_key {
                HaResult::Success(())
            } else {
                HaResult::Error {
                    code: HandlerError::FOUND_DUPP_KEY,
                    function: "write_row",
                }
            };
        }
        if self.max_rows.is_some_and(|max_rows| self.rows.len() >= max_rows) {
            return HaResult::Error {
                code: HandlerError::RECORD_FILE_FULL,
                function: "write_row",
            };
        }
        if let Some(index) = &mut self.hash_index {
            index.insert(row.clone());
        }
        self.rows.push(row);
        HaResult::Success(())
    }
}

impl Diagnostics for HeapHandler {
    fn print_error(&self, code: HandlerError) -> String {
        format!(
            "Got error {} \"{}\" from storage engine for table '{}'",
            code.0,
            code.message(),
            self.table_name
        )
    }
}

impl ScanHandle for HeapHandler {
    fn init_sequential_scan(&mut self, _read_only: bool) -> HaResult<()> {
        if let Some(code) = self.scan_init_fault {
            return HaResult::Error {
                code,
                function: "rnd_init",
            };
        }
        self.position = Some(0);
        HaResult::Success(())
    }

    fn next_row(&mut self) -> HaResult<Row> {
        let Some(position) = self.position else {
            return HaResult::Error {
                code: HandlerError::WRONG_COMMAND,
                function: "rnd_next",
            };
        };
        if let Some((row, code)) = self.scan_row_fault {
            if row == position {
                return HaResult::Error {
                    code,
                    function: "rnd_next",
                };
            }
        }
        match self.rows.get(position) {
            Some(row) => {
                self.position = Some(position + 1);
                HaResult::Success(row.clone())
            }
            None => HaResult::EndOfFile,
        }
    }

    fn end_scan(&mut self) -> HaResult<()> {
        self.position = None;
        HaResult::Success(())
    }
}
