pub mod decode;
pub mod encode;
pub mod info;
pub mod send;
pub mod stats;

pub use decode::*;
pub use encode::*;
pub use info::*;
pub use send::*;
pub use stats::*;
