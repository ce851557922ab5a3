pub mod attendance;
pub mod health;
pub mod order;
pub mod product;
pub mod staff;
