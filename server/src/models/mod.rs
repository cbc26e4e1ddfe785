// orderdesk/src/models/mod.rs

//! Database entities and the order read model.

pub mod order;
pub mod order_item;
pub mod product;
pub mod session;
pub mod user;

pub use order::{Order, OrderWithItems};
pub use order_item::{LineItemRequest, OrderItem};
pub use product::Product;
pub use session::Session;
pub use user::User;
