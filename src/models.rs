pub mod auth;
pub mod config;
pub mod customer;
pub mod gaji;
pub mod jam_kerja;
pub mod karil;
pub mod tuton;
