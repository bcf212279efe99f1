pub mod actor;
pub mod appointment;
pub mod catalog;
pub mod work_schedule;
