//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// Canonical item rows keyed by normalized key (`StoredItem`, bincode-encoded).
pub const ITEMS: TableDefinition<&str, &[u8]> = TableDefinition::new("items");

/// Expiry index ordered by expiry millis then normalized key.
///
/// Only items with an expiry are indexed; the sweeper range-scans this table.
pub const ITEMS_BY_EXPIRY: TableDefinition<(u64, &str), ()> =
    TableDefinition::new("items_by_expiry");
