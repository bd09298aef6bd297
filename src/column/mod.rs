pub mod codec;
pub mod column_metadata;
pub mod column_type;
pub mod column_value;
