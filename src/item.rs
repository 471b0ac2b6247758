use std::hash::{Hash, Hasher};

/// Indication of whether a column is nullable or not.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Nullable {
    #[default]
    Unknown,
    Nullable,
    NoNulls,
}

/// Type of a column as reported to the client.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum DataType {
    /// The type could not be determined.
    #[default]
    Unknown,
    /// 64 Bit signed integer.
    BigInt,
    /// 64 Bit floating point.
    Double,
    /// Variable length character data, `length` is the maximum number of characters.
    Varchar { length: usize },
    /// Variable length binary data, `length` is the maximum number of bytes.
    Varbinary { length: usize },
}

/// A single field of a row.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Int(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// A row as it is produced by the execution engine and stored in temporary tables.
pub type Row = Vec<Value>;

// Doubles are compared by bit pattern, so a value is always equal to itself. This is the notion of
// equality required for de-duplicating rows in a hash index.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => (),
            Value::Int(i) => i.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::Text(text) => text.hash(state),
            Value::Bytes(bytes) => bytes.hash(state),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Describes one output column of a statement. Besides the type, an item carries the identity of
/// the column: the name displayed to the client and where the column originates from.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Item {
    /// Column name as displayed to the client. This is the alias, if one has been specified.
    pub name: String,
    /// Name of the column in the table it originates from. Empty for computed columns.
    pub org_name: String,
    /// Table name as used in the query. This is the alias of the table, if one has been specified.
    pub table_name: String,
    /// Name of the table the column originates from.
    pub org_table_name: String,
    /// Database (schema) of the originating table.
    pub db_name: String,
    pub data_type: DataType,
    pub nullable: Nullable,
}

impl Item {
    /// A computed column without origin.
    pub fn new(name: &str, data_type: DataType) -> Self {
        Item {
            name: name.to_owned(),
            data_type,
            ..Item::default()
        }
    }

    /// A column read from table `table` in database `db`. Display names equal the original names.
    pub fn column(db: &str, table: &str, column: &str, data_type: DataType) -> Self {
        Item {
            name: column.to_owned(),
            org_name: column.to_owned(),
            table_name: table.to_owned(),
            org_table_name: table.to_owned(),
            db_name: db.to_owned(),
            data_type,
            nullable: Nullable::Unknown,
        }
    }

    /// Changes the displayed column name, i.e. `SELECT column AS alias`.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.name = alias.to_owned();
        self
    }

    /// Changes the displayed table name, i.e. `FROM table AS alias`.
    pub fn with_table_alias(mut self, alias: &str) -> Self {
        self.table_name = alias.to_owned();
        self
    }

    pub fn with_nullable(mut self, nullable: Nullable) -> Self {
        self.nullable = nullable;
        self
    }

    /// The field description sent to the client as part of the result set metadata.
    pub fn make_field(&self) -> SendField {
        SendField {
            db_name: self.db_name.clone(),
            table_name: self.table_name.clone(),
            org_table_name: self.org_table_name.clone(),
            col_name: self.name.clone(),
            org_col_name: self.org_name.clone(),
            data_type: self.data_type,
            nullable: self.nullable,
        }
    }
}

/// Column metadata as it is put on the wire.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SendField {
    pub db_name: String,
    pub table_name: String,
    pub org_table_name: String,
    pub col_name: String,
    pub org_col_name: String,
    pub data_type: DataType,
    pub nullable: Nullable,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{DataType, Item, Value};

    #[test]
    fn alias_only_changes_display_name() {
        let item = Item::column("shop", "orders", "id", DataType::BigInt).with_alias("order_id");

        let field = item.make_field();

        assert_eq!("order_id", field.col_name);
        assert_eq!("id", field.org_col_name);
        assert_eq!("orders", field.table_name);
    }

    #[test]
    fn equal_doubles_hash_equally() {
        let mut set = HashSet::new();
        set.insert(vec![Value::Double(0.5), Value::Null]);
        assert!(!set.insert(vec![Value::Double(0.5), Value::Null]));
        assert!(set.insert(vec![Value::Double(-0.5), Value::Null]));
    }
}
