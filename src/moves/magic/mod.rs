pub mod attacks;
pub mod precompute;
pub mod search;
pub mod structs;

pub use precompute::{MagicTableSeed, generate_magic_tables, tables};
pub use structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
