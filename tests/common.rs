use materialized_cursor::{
    DataType, Item, Nullable, Packet, PassthroughSink, QueryExpression, SqlCommand, Value,
    handles::ServerStatus,
};

/// Install a logger printing to the test output. Only the first call in a process has an effect.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Columns of `SELECT o.id AS order_id, o.customer, o.total FROM shop.orders AS o`.
pub fn order_columns() -> Vec<Item> {
    vec![
        Item::column("shop", "orders", "id", DataType::BigInt)
            .with_alias("order_id")
            .with_table_alias("o")
            .with_nullable(Nullable::NoNulls),
        Item::column("shop", "orders", "customer", DataType::Varchar { length: 50 })
            .with_table_alias("o"),
        Item::column("shop", "orders", "total", DataType::Double).with_table_alias("o"),
    ]
}

/// Rows of the orders table, with ids `1..=num_rows`.
pub fn order_rows(num_rows: i64) -> Vec<Vec<Value>> {
    (1..=num_rows)
        .map(|id| {
            vec![
                Value::Int(id),
                Value::from(format!("customer {id}").as_str()),
                Value::Double(id as f64 * 10.5),
            ]
        })
        .collect()
}

/// Selects `num_rows` orders.
pub fn select_orders(num_rows: i64) -> SqlCommand {
    SqlCommand::Select(QueryExpression::new(order_columns(), order_rows(num_rows)))
}

/// Order ids sent by `sink` so far, in order.
pub fn sent_ids(sink: &PassthroughSink) -> Vec<i64> {
    sink.rows()
        .map(|row| match row[0] {
            Value::Int(id) => id,
            ref other => panic!("Unexpected order id {other:?}"),
        })
        .collect()
}

/// Status of every end of data packet sent by `sink`, in order, masked to the cursor bits.
pub fn cursor_states(sink: &PassthroughSink) -> Vec<ServerStatus> {
    sink.packets()
        .iter()
        .filter_map(|packet| match packet {
            Packet::Eof { status } => Some(ServerStatus(
                status.bits() & ServerStatus::CURSOR_STATE.bits(),
            )),
            _ => None,
        })
        .collect()
}
