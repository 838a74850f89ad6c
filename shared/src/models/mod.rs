//! Domain models for the Harvest Control platform

mod crop;
mod fleet;
mod harvest;
mod humidity;

pub use crop::*;
pub use fleet::*;
pub use harvest::*;
pub use humidity::*;
