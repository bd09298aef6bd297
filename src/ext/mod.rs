pub mod bit_set;
pub mod cursor_ext;
