pub mod model;
pub mod repository;

pub use model::{Customer, CustomerPatch};
pub use repository::CustomerRepository;
