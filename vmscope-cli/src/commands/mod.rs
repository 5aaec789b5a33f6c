pub mod candidates;
pub mod common;
pub mod locate;
pub mod types;
