pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod input;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod session;
