pub mod appointment;
pub mod catalog;
pub mod history;
pub mod work_schedule;
