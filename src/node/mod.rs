mod handle;
mod manager;
mod role;
mod spec;

pub use handle::*;
pub use manager::*;
pub use role::*;
pub use spec::*;
