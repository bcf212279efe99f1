pub mod appointments;
pub mod masters;
