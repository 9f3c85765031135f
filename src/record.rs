//! Identity records and the fixed-slot record store.
//!
//! Each user owns exactly one 16-byte slot, addressed purely by ID. The
//! slot layout is fixed-offset:
//!
//! ```text
//! byte    0    1..5           5..15        15
//! field   id   password (LE)  payload      0x00
//! ```
//!
//! A slot whose id byte is `0xFF` (or outside the slot range) decodes as
//! absent; deletion writes that sentinel record rather than erasing the
//! cells. Callers never see the sentinel; reads yield `Option<User>`.

use crate::store::{ByteStore, Result};

/// Bytes per slot.
pub const SLOT_SIZE: usize = 16;
/// Hard capacity ceiling: one slot per possible ID.
pub const SLOT_COUNT: usize = 64;
/// Payload bytes per record, terminator excluded.
pub const DATA_LEN: usize = 10;

const ID_OFFSET: usize = 0;
const PW_OFFSET: usize = 1;
const DATA_OFFSET: usize = 5;
const TERMINATOR_OFFSET: usize = 15;

const SENTINEL_ID: u8 = 0xFF;
const SENTINEL_PW: u32 = 0xFFFF_FFFF;
const SENTINEL_DATA: &[u8] = b"NULL";

/// Bounds-checked slot index, 0..=63.
///
/// Constructed only through `new`, so raw operator input can never drive
/// address arithmetic past the slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotId(u8);

impl SlotId {
    pub const MAX: u8 = (SLOT_COUNT - 1) as u8;

    pub fn new(raw: u64) -> Option<Self> {
        if raw <= u64::from(Self::MAX) {
            Some(Self(raw as u8))
        } else {
            None
        }
    }

    /// Byte offset of this slot in the store: `id * 16`.
    pub fn address(self) -> usize {
        usize::from(self.0) * SLOT_SIZE
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// All slot ids in ascending order.
    pub fn all() -> impl Iterator<Item = SlotId> {
        (0..=Self::MAX).map(SlotId)
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof that the admin gate accepted a credential pair.
///
/// Granted per invocation and carried only for the pending operation;
/// the privileged password disclosure path demands one.
#[derive(Debug)]
pub struct AdminToken {
    _private: (),
}

impl AdminToken {
    pub(crate) fn grant() -> Self {
        Self { _private: () }
    }
}

/// 32-bit numeric secret.
///
/// The raw value is reachable only through `authenticate` and the
/// admin-gated `reveal`; the general record-read path never carries it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Password(u32);

impl Password {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// True iff the candidate equals the stored value exactly.
    pub fn authenticate(&self, candidate: u32) -> bool {
        self.0 == candidate
    }

    /// Privileged disclosure, used by the administrative listing only.
    pub fn reveal(&self, _admin: &AdminToken) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Password(****)")
    }
}

/// A single identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: SlotId,
    password: Password,
    data: [u8; DATA_LEN],
}

impl User {
    /// Builds an in-memory record. The payload is truncated at ten bytes
    /// and zero-padded below that; nothing is persisted until the record
    /// is handed to [`RecordStore::write`].
    pub fn new(id: SlotId, password: u32, payload: &[u8]) -> Self {
        let mut data = [0u8; DATA_LEN];
        let n = payload.len().min(DATA_LEN);
        data[..n].copy_from_slice(&payload[..n]);
        Self {
            id,
            password: Password::new(password),
            data,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn data(&self) -> &[u8; DATA_LEN] {
        &self.data
    }

    /// Payload rendered as text, up to the first NUL.
    pub fn data_text(&self) -> String {
        let end = self.data.iter().position(|&b| b == 0).unwrap_or(DATA_LEN);
        String::from_utf8_lossy(&self.data[..end]).into_owned()
    }

    pub fn authenticate(&self, candidate: u32) -> bool {
        self.password.authenticate(candidate)
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    fn encode(&self) -> [u8; SLOT_SIZE] {
        let mut buf = [0u8; SLOT_SIZE];
        buf[ID_OFFSET] = self.id.index();
        buf[PW_OFFSET..DATA_OFFSET].copy_from_slice(&self.password.0.to_le_bytes());
        buf[DATA_OFFSET..TERMINATOR_OFFSET].copy_from_slice(&self.data);
        buf[TERMINATOR_OFFSET] = 0x00;
        buf
    }

    /// Decodes a slot image. Sentinel or out-of-range id bytes yield
    /// `None`; everything else is taken as-is; torn slots are the
    /// caller's to judge.
    fn decode(buf: &[u8; SLOT_SIZE]) -> Option<Self> {
        let id = SlotId::new(u64::from(buf[ID_OFFSET]))?;
        let password = u32::from_le_bytes(buf[PW_OFFSET..DATA_OFFSET].try_into().unwrap());
        let mut data = [0u8; DATA_LEN];
        data.copy_from_slice(&buf[DATA_OFFSET..TERMINATOR_OFFSET]);
        Some(Self {
            id,
            password: Password::new(password),
            data,
        })
    }
}

fn sentinel_slot() -> [u8; SLOT_SIZE] {
    let mut buf = [0u8; SLOT_SIZE];
    buf[ID_OFFSET] = SENTINEL_ID;
    buf[PW_OFFSET..DATA_OFFSET].copy_from_slice(&SENTINEL_PW.to_le_bytes());
    buf[DATA_OFFSET..DATA_OFFSET + SENTINEL_DATA.len()].copy_from_slice(SENTINEL_DATA);
    buf
}

/// Serializes records to and from a [`ByteStore`], one slot per ID.
///
/// Addressing is a pure function of the slot id; no free list, no
/// indirection. Multi-byte writes are not atomic as a whole: a hard stop
/// mid-slot leaves a torn record, detectable only by its field values.
pub struct RecordStore<S> {
    store: S,
}

impl<S: ByteStore> RecordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn write(&mut self, user: &User) -> Result<()> {
        self.write_slot(user.id().address(), &user.encode())
    }

    pub fn read(&mut self, id: SlotId) -> Result<Option<User>> {
        let base = id.address();
        let mut buf = [0u8; SLOT_SIZE];
        for (i, cell) in buf.iter_mut().enumerate() {
            *cell = self.store.read_byte(base + i)?;
        }
        Ok(User::decode(&buf))
    }

    /// Overwrites the slot with the sentinel record. No existence check;
    /// repeating it is a no-op.
    pub fn erase(&mut self, id: SlotId) -> Result<()> {
        self.write_slot(id.address(), &sentinel_slot())
    }

    fn write_slot(&mut self, base: usize, buf: &[u8; SLOT_SIZE]) -> Result<()> {
        for (i, &cell) in buf.iter().enumerate() {
            self.store.write_byte(base + i, cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn records() -> RecordStore<MemStore> {
        RecordStore::new(MemStore::default())
    }

    fn slot(raw: u64) -> SlotId {
        SlotId::new(raw).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let mut db = records();
        let user = User::new(slot(5), 12345678, b"HELLO");
        db.write(&user).unwrap();

        let read = db.read(slot(5)).unwrap().expect("record present");
        assert_eq!(read, user);
        assert_eq!(read.id().index(), 5);
        assert!(read.authenticate(12345678));
        assert_eq!(read.data_text(), "HELLO");
    }

    #[test]
    fn test_terminator_byte_always_zero() {
        let mut db = RecordStore::new(MemStore::default());
        db.write(&User::new(slot(2), 99, b"0123456789")).unwrap();

        // Raw byte 15 of the slot stays zero even with a full payload.
        let addr = slot(2).address() + 15;
        let store = &mut db.store;
        assert_eq!(store.read_byte(addr).unwrap(), 0x00);
    }

    #[test]
    fn test_short_payload_zero_padded() {
        let user = User::new(slot(0), 1, b"AB");
        assert_eq!(&user.data()[..2], b"AB");
        assert!(user.data()[2..].iter().all(|&b| b == 0));
        assert_eq!(user.data_text(), "AB");
    }

    #[test]
    fn test_payload_truncated_at_ten_bytes() {
        let user = User::new(slot(0), 1, b"ABCDEFGHIJKLMNOP");
        assert_eq!(user.data(), b"ABCDEFGHIJ");
    }

    #[test]
    fn test_fresh_store_is_all_absent() {
        let mut db = records();
        for id in SlotId::all() {
            assert!(db.read(id).unwrap().is_none());
        }
    }

    #[test]
    fn test_erase_is_idempotent() {
        let mut db = records();
        db.write(&User::new(slot(9), 42, b"GONE")).unwrap();

        db.erase(slot(9)).unwrap();
        assert!(db.read(slot(9)).unwrap().is_none());

        db.erase(slot(9)).unwrap();
        assert!(db.read(slot(9)).unwrap().is_none());
    }

    #[test]
    fn test_erase_without_existence_check() {
        let mut db = records();
        db.erase(slot(31)).unwrap();
        assert!(db.read(slot(31)).unwrap().is_none());
    }

    #[test]
    fn test_overwrite_replaces_record() {
        let mut db = records();
        db.write(&User::new(slot(7), 111, b"OLD")).unwrap();
        db.write(&User::new(slot(7), 222, b"NEW")).unwrap();

        let read = db.read(slot(7)).unwrap().unwrap();
        assert!(read.authenticate(222));
        assert!(!read.authenticate(111));
        assert_eq!(read.data_text(), "NEW");
    }

    #[test]
    fn test_addressing_bijection() {
        let mut seen = std::collections::HashSet::new();
        for id in SlotId::all() {
            assert_eq!(id.address(), usize::from(id.index()) * 16);
            assert!(seen.insert(id.address()), "address collision at {id}");
        }
        assert_eq!(seen.len(), SLOT_COUNT);
    }

    #[test]
    fn test_slot_id_bounds() {
        assert!(SlotId::new(0).is_some());
        assert!(SlotId::new(63).is_some());
        assert!(SlotId::new(64).is_none());
        assert!(SlotId::new(255).is_none());
        assert!(SlotId::new(u64::MAX).is_none());
    }

    #[test]
    fn test_authenticate_exactness() {
        let user = User::new(slot(1), 12345678, b"X");
        assert!(user.authenticate(12345678));
        assert!(!user.authenticate(12345679));
        assert!(!user.authenticate(1234567));
        assert!(!user.authenticate(0));
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let user = User::new(slot(1), 987654, b"X");
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("987654"));
    }

    #[test]
    fn test_reveal_requires_token() {
        let user = User::new(slot(1), 4321, b"X");
        let token = AdminToken::grant();
        assert_eq!(user.password().reveal(&token), 4321);
    }

    #[test]
    fn test_sentinel_slot_layout() {
        let buf = sentinel_slot();
        assert_eq!(buf[0], 0xFF);
        assert_eq!(&buf[1..5], &[0xFF; 4]);
        assert_eq!(&buf[5..9], b"NULL");
        assert_eq!(buf[15], 0x00);
    }
}
