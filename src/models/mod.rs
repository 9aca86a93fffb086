pub mod catalog;
pub mod checkout;
pub mod common;
pub mod creator;
pub mod earnings;
pub mod leaderboard;
pub mod order;
pub mod profile;

pub use catalog::*;
pub use checkout::*;
pub use common::*;
pub use creator::*;
pub use earnings::*;
pub use leaderboard::*;
pub use order::*;
pub use profile::*;
