pub mod catalog;
pub mod checkout;
pub mod creator;
pub mod dashboard;
pub mod profile;
pub mod webhook;

pub use catalog::catalog_config;
pub use checkout::checkout_config;
pub use creator::creator_config;
pub use dashboard::dashboard_config;
pub use profile::profile_config;
pub use webhook::webhook_config;
