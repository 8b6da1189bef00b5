pub mod auth;
pub mod config;
pub mod customers;
pub mod events;
pub mod gaji;
pub mod jam_kerja;
pub mod karil;
pub mod tuton;
