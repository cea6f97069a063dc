// Working-set curation: browse a generation batch, keep the questions worth
// keeping, and hand the named set to the question bank.

pub mod durable;
pub mod navigator;
pub mod store;
pub mod submission;
