pub mod entity;
pub mod migrations;
pub mod repo;

pub use repo::SeaOrmRepository;
