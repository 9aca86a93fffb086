pub mod email_templates;
pub mod jwt;
pub mod pagination;
pub mod validation;

pub use jwt::*;
pub use pagination::*;
pub use validation::*;
