pub mod channel;
pub mod fano;
pub mod orthogonal;
pub mod pack;

pub use channel::*;
pub use fano::*;
pub use orthogonal::*;
pub use pack::*;
