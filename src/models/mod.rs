pub mod collection;
pub mod criteria;
pub mod job;
