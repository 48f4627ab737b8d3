mod basic;
mod interface;
mod lock;
mod table;

pub use basic::*;
pub use interface::*;
pub use lock::*;
pub use table::*;
