pub mod args;
pub mod bag;
pub mod combine;
pub mod controller;
pub mod error;
pub mod feed;
pub mod identity;
pub mod model;
pub mod storage;
pub mod view;

pub use bag::Bag;
pub use error::AppError;
