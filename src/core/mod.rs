pub mod clipboard;
pub mod error;
