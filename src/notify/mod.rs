pub mod dispatch;
pub mod models;
pub mod provider;
pub use dispatch::*;
pub use models::*;
pub use provider::*;
