use redb::TableDefinition;

use vakt_core::StorageArea;

/// Records written while consent is pending.
/// Key: per-area sequence number
/// Value: serialized Record as bytes
pub const PROVISIONAL_TABLE: TableDefinition<u64, &[u8]> =
    TableDefinition::new("provisional_records");

/// Records written with consent granted.
/// Key: per-area sequence number
/// Value: serialized Record as bytes
pub const AUTHORIZED_TABLE: TableDefinition<u64, &[u8]> =
    TableDefinition::new("authorized_records");

/// Last sequence number handed out per area.
/// Key: area name
/// Value: last sequence number as u64
pub const SEQUENCES_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// The record table backing an area.
pub fn records_table(area: StorageArea) -> TableDefinition<'static, u64, &'static [u8]> {
    match area {
        StorageArea::Provisional => PROVISIONAL_TABLE,
        StorageArea::Authorized => AUTHORIZED_TABLE,
    }
}
