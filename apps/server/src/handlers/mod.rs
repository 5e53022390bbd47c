pub mod admin;
pub mod availability;
pub mod seats;
