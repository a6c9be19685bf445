pub mod errors;
pub mod id;
pub mod types;

pub use errors::{BillingError, ConfigError};
pub use id::{new_id, SessionId};
pub use types::{Turn, TurnRole};
