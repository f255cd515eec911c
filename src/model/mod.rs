pub mod catalog;
pub mod combine;
pub mod matrix;
pub mod swing;
pub mod user;
pub mod wedge;

pub use combine::*;
pub use matrix::*;
pub use swing::*;
pub use user::*;
pub use wedge::*;
