// Library interface for sitecheck
// This allows integration tests to access the modules

pub mod checker;
pub mod error;
pub mod logging;
pub mod network;
pub mod options;
pub mod report;
pub mod sitemap;
pub mod utils;
