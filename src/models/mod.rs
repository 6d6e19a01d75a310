pub mod account;
pub mod provider;
pub mod task;

pub use account::*;
pub use provider::*;
pub use task::*;
