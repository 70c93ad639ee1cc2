pub mod aggregator;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod providers;
pub mod routes;
pub mod translation;

pub use aggregator::{Aggregator, SearchOptions};
pub use error::AppError;
pub use models::collection::{MultiCollection, Operator, Order, ResultCollection};
pub use models::criteria::SearchCriteria;
pub use models::job::JobRecord;
