pub mod email;
pub mod stripe;

pub use self::email::*;
pub use self::stripe::*;
