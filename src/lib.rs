pub mod domain;
pub mod ports;
pub mod application;
pub mod infrastructure;
pub mod cli;
