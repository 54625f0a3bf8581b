pub mod colour;
pub mod config;
pub mod deliver;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod report;
pub mod series;
pub mod stats;
pub mod window;
pub mod zone;
