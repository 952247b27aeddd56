mod decode;
mod frame;
mod sensors;

pub use decode::*;
pub use frame::*;
pub use sensors::*;
