pub mod contact_service;
pub mod notification_service;
pub mod order_service;
pub mod settings_service;

pub use contact_service::*;
pub use notification_service::*;
pub use order_service::*;
pub use settings_service::*;
