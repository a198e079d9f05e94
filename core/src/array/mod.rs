pub mod antenna;
pub mod catalog;
pub mod report;

pub use antenna::{AntennaPoint, AntennaSite};
pub use catalog::{survey_sites, CLUSTER_MARGIN, ORIGIN_INDEX, OUTLIER_INDEX};
pub use report::ArrayReport;
