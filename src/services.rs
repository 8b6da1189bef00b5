pub mod auth;
pub mod config_service;
pub mod customer_service;
pub mod gaji_service;
pub mod jam_kerja_service;
pub mod karil_service;
pub mod realtime;
pub mod tuton_service;
