pub mod backend;
pub mod generator;
mod http;
pub mod project;
