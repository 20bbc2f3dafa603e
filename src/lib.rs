pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod source;
pub mod views;
