use log::trace;

use crate::{
    Error, Item, QueryShape, ResultSink, Row, SendField, SendFlags, Session, Value,
    handles::ServerStatus,
};

/// A protocol level event as it would be written to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Description of the result set columns.
    Metadata {
        fields: Vec<SendField>,
        flags: SendFlags,
    },
    Row(Row),
    /// End of metadata or end of a batch of rows, together with the session status at that time.
    Eof { status: ServerStatus },
    /// A partially sent result set has been rolled back.
    Abort,
}

/// Forwards the output of a statement to the client. Instead of a socket the packets are written
/// into an in memory outbox, which can be inspected with [`Self::packets`].
#[derive(Debug, Default)]
pub struct PassthroughSink {
    packets: Vec<Packet>,
    /// Column count this result has been prepared for, if any.
    prepared_columns: Option<usize>,
    /// Number of calls to `begin_dataset`.
    num_datasets: usize,
    rows_sent: usize,
    /// Emulates a broken connection: sending the row with this zero based index fails.
    fail_at_row: Option<usize>,
}

impl PassthroughSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose connection breaks when sending the `index`-th row (zero based, counted over
    /// the lifetime of the sink).
    pub fn failing_at_row(index: usize) -> Self {
        Self {
            fail_at_row: Some(index),
            ..Self::default()
        }
    }

    /// Everything sent so far, in order.
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Takes the packets sent so far, leaving the outbox empty.
    pub fn take_packets(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.packets)
    }

    /// Rows sent so far, in order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.packets.iter().filter_map(|packet| match packet {
            Packet::Row(row) => Some(row),
            _ => None,
        })
    }

    /// Field descriptions of the last metadata sent.
    pub fn fields(&self) -> Option<&[SendField]> {
        self.packets.iter().rev().find_map(|packet| match packet {
            Packet::Metadata { fields, .. } => Some(fields.as_slice()),
            _ => None,
        })
    }

    /// Status reported with the last end of data packet.
    pub fn last_status(&self) -> Option<ServerStatus> {
        self.packets.iter().rev().find_map(|packet| match packet {
            Packet::Eof { status } => Some(*status),
            _ => None,
        })
    }

    pub fn prepared_columns(&self) -> Option<usize> {
        self.prepared_columns
    }

    pub fn num_datasets(&self) -> usize {
        self.num_datasets
    }
}

impl ResultSink for PassthroughSink {
    fn prepare(
        &mut self,
        _session: &mut Session,
        columns: &[Item],
        _shape: &QueryShape,
    ) -> Result<(), Error> {
        self.prepared_columns = Some(columns.len());
        Ok(())
    }

    fn send_result_set_metadata(
        &mut self,
        _session: &mut Session,
        columns: &[Item],
        flags: SendFlags,
    ) -> Result<(), Error> {
        let fields = columns.iter().map(Item::make_field).collect();
        self.packets.push(Packet::Metadata { fields, flags });
        Ok(())
    }

    fn send_data(
        &mut self,
        _session: &mut Session,
        columns: &[Item],
        row: &[Value],
    ) -> Result<(), Error> {
        if self.fail_at_row == Some(self.rows_sent) {
            return Err(Error::Delivery {
                reason: "Connection reset by peer".to_owned(),
            });
        }
        debug_assert_eq!(columns.len(), row.len());
        self.packets.push(Packet::Row(row.to_vec()));
        self.rows_sent += 1;
        Ok(())
    }

    fn begin_dataset(&mut self) {
        self.num_datasets += 1;
    }

    fn send_eof(&mut self, session: &mut Session) -> Result<(), Error> {
        trace!("Sending EOF with server status {:#06x}.", session.server_status.bits());
        self.packets.push(Packet::Eof {
            status: session.server_status,
        });
        Ok(())
    }

    fn abort_result_set(&mut self, _session: &mut Session) {
        self.packets.push(Packet::Abort);
    }
}
