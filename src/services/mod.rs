pub mod catalog_service;
pub mod checkout_service;
pub mod creator_service;
pub mod earnings_service;
pub mod leaderboard_service;
pub mod notification_service;
pub mod order_service;
pub mod payout_service;
pub mod profile_service;
#[cfg(test)]
pub(crate) mod test_support;

pub use catalog_service::*;
pub use checkout_service::*;
pub use creator_service::*;
pub use earnings_service::*;
pub use leaderboard_service::*;
pub use notification_service::*;
pub use order_service::*;
pub use payout_service::*;
pub use profile_service::*;
