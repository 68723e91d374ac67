pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod report;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;
