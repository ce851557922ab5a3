//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod order_counter_repo;
pub mod order_repo;
pub mod product_repo;
pub mod staff_repo;

pub use order_counter_repo::OrderCounterRepo;
pub use order_repo::OrderRepo;
pub use product_repo::ProductRepo;
pub use staff_repo::StaffRepo;
