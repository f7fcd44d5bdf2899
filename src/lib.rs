pub mod aggregate;
pub mod config;
pub mod driver;
pub mod fetch;
pub mod parse;
pub mod states;
pub mod table;
