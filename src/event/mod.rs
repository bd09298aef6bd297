pub mod binlog_event;
pub mod checksum_type;
pub mod delete_rows_event;
pub mod dml_event;
pub mod error_event;
pub mod event_data;
pub mod event_header;
pub mod event_type;
pub mod format_description_event;
pub mod gtid_event;
pub mod previous_gtids_event;
pub mod query_event;
pub mod registry;
pub mod rotate_event;
pub mod row_event;
pub mod row_set;
pub mod rows_event;
pub mod rows_query_event;
pub mod table_map_event;
pub mod table_metadata;
pub mod transaction_payload_event;
pub mod update_rows_event;
pub mod write_rows_event;
pub mod xa_prepare_event;
pub mod xid_event;
