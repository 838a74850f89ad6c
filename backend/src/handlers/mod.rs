//! HTTP handlers for the Harvest Control platform

mod crop;
mod harvest;
mod health;
mod humidity_band;
mod reporting;

pub use crop::*;
pub use harvest::*;
pub use health::*;
pub use humidity_band::*;
pub use reporting::*;
