pub mod media;
pub mod seed;
pub mod storage;
