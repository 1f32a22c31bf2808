pub mod connection;
pub mod order_repository;
pub mod settings_repository;

pub use connection::*;
pub use order_repository::{OrderRepository, SeaOrmOrderRepository};
pub use settings_repository::{SeaOrmSettingsRepository, SettingsRepository};
