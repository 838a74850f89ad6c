//! Business logic services for the Harvest Control platform

pub mod crop;
pub mod harvest;
pub mod humidity_band;
pub mod reporting;

pub use crop::CropService;
pub use harvest::HarvestLoadService;
pub use humidity_band::HumidityBandService;
pub use reporting::ReportingService;
