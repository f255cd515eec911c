pub mod auth;
pub mod bag;
pub mod clock;
pub mod combine;
pub mod layout;
pub mod matrix;
pub mod profile;
