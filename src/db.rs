pub mod config_repo;
pub mod customer_repo;
pub mod gaji_repo;
pub mod jam_kerja_repo;
pub mod karil_repo;
pub mod tuton_repo;
pub mod user_repo;

pub use config_repo::ConfigRepository;
pub use customer_repo::CustomerRepository;
pub use gaji_repo::GajiRepository;
pub use jam_kerja_repo::JamKerjaRepository;
pub use karil_repo::KarilRepository;
pub use tuton_repo::TutonRepository;
pub use user_repo::UserRepository;
