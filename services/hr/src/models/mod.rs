//! HR service models

pub mod attendance;
pub mod employee;
pub mod leave;
pub mod user;

// Re-export for convenience
pub use attendance::{AttendanceInput, AttendanceRecord};
pub use employee::{
    CreateEmployeeRequest, Employee, EmployeeFields, EmployeeStatus, EmployeeWithPermissions,
    UpdateEmployeeRequest,
};
pub use leave::{LeaveApplication, LeaveInput, LeaveRequest, LeaveStatus};
pub use user::{
    ChangePasswordRequest, LoginCredentials, NewUser, PublicUser, Role, SetRoleRequest, User,
};
