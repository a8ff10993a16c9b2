pub mod order;
pub mod order_line;

pub use order::{CreateOrderRequest, Order, OrderStatus, UpdateOrderRequest};
pub use order_line::{CreateOrderLineRequest, OrderLine};
