pub mod common;
pub mod contact;
pub mod order;
pub mod settings;

pub use common::*;
pub use contact::*;
pub use order::*;
pub use settings::*;
