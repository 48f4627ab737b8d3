mod decision;
mod error;
mod ipv4;
mod mutex;
mod pool;
mod state;
mod time;

pub use crate::decision::*;
pub use crate::error::*;
pub use crate::ipv4::*;
pub use crate::mutex::LockError;
pub use crate::pool::*;
pub use crate::state::*;
pub use crate::time::*;
