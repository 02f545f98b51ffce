pub mod error;
pub mod filter;
pub mod image;
pub mod ports;
pub mod repo;
pub mod service;
pub mod shopping_list;
