use std::collections::HashMap;

use tracing::debug;

use crate::event::table_map_event::TableMapEvent;

/// Table definitions seen on one connection, keyed by table id.
///
/// Table ids are reassigned by the server after DDL, so a new table map
/// always replaces the cached entry instead of merging into it.
#[derive(Debug, Default, Clone)]
pub struct ReplicationState {
    table_map_event_by_table_id: HashMap<u64, TableMapEvent>,
}

impl ReplicationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a table map, returning the entry it replaced.
    pub fn put_table_map(&mut self, event: TableMapEvent) -> Option<TableMapEvent> {
        debug!(
            "table map {} -> {}.{} ({} columns)",
            event.table_id,
            event.schema_name,
            event.table_name,
            event.column_types.len()
        );
        self.table_map_event_by_table_id.insert(event.table_id, event)
    }

    pub fn get_table_map(&self, table_id: u64) -> Option<&TableMapEvent> {
        self.table_map_event_by_table_id.get(&table_id)
    }

    pub fn len(&self) -> usize {
        self.table_map_event_by_table_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table_map_event_by_table_id.is_empty()
    }
}
