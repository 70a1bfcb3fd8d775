pub mod attendance;
pub mod employee;
pub mod employee_log;
pub mod role;
