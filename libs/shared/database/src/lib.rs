pub mod error;
pub mod memory;
pub mod records;
pub mod state;
