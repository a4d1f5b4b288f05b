pub mod config;
pub mod date;
pub mod fetch;
pub mod ident;
pub mod inspect;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod text;
pub mod venue;
