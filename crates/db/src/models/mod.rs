//! Database row structs and DTOs.

pub mod order;
