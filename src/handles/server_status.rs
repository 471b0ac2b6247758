use std::ops::{BitOr, BitOrAssign};

/// Status flags of a session, sent to the client with every end of data packet. The bit values
/// are part of the client server protocol and must not be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ServerStatus(pub u16);

impl ServerStatus {
    /// A transaction is active.
    pub const IN_TRANS: ServerStatus = ServerStatus(0x0001);
    /// Autocommit mode is set.
    pub const AUTOCOMMIT: ServerStatus = ServerStatus(0x0002);
    /// A read-only server side cursor is open. More rows may be fetched from it.
    pub const CURSOR_EXISTS: ServerStatus = ServerStatus(0x0040);
    /// The last row of an open cursor has been sent. The cursor is closed.
    pub const LAST_ROW_SENT: ServerStatus = ServerStatus(0x0080);

    /// Bits reported by a cursor. Reset before each cursor operation, so a client never observes a
    /// stale flag from a previous round trip.
    pub const CURSOR_STATE: ServerStatus =
        ServerStatus(Self::CURSOR_EXISTS.0 | Self::LAST_ROW_SENT.0);

    /// No flags set.
    pub fn empty() -> Self {
        ServerStatus(0)
    }

    /// Raw bits as they are put on the wire.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// `true` if all bits of `other` are set in `self`.
    pub fn contains(self, other: ServerStatus) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ServerStatus) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ServerStatus) {
        self.0 &= !other.0;
    }
}

impl BitOr for ServerStatus {
    type Output = ServerStatus;

    fn bitor(self, rhs: Self) -> Self::Output {
        ServerStatus(self.0 | rhs.0)
    }
}

impl BitOrAssign for ServerStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::ServerStatus;

    /// Clients decode these bits, so they must match the existing protocol exactly.
    #[test]
    fn cursor_bits_match_wire_protocol() {
        assert_eq!(64, ServerStatus::CURSOR_EXISTS.bits());
        assert_eq!(128, ServerStatus::LAST_ROW_SENT.bits());
    }

    #[test]
    fn insert_and_remove() {
        let mut status = ServerStatus::AUTOCOMMIT;
        status |= ServerStatus::CURSOR_EXISTS;
        assert!(status.contains(ServerStatus::CURSOR_EXISTS | ServerStatus::AUTOCOMMIT));

        status.remove(ServerStatus::CURSOR_STATE);

        assert_eq!(ServerStatus::AUTOCOMMIT, status);
    }
}
