pub mod code_generator;
pub mod email_template;
pub mod money;
pub mod phone;
pub mod validation;
pub mod whatsapp_message;

pub use code_generator::generate_order_number;
pub use email_template::{Audience, Branding, escape_html};
pub use money::{format_rupees, line_total, to_decimal};
pub use phone::*;
pub use validation::is_valid_email;
pub use whatsapp_message::format_order_message;
