pub mod appointment;
pub mod availability;
pub mod enums;

pub use appointment::*;
pub use availability::*;
pub use enums::*;
