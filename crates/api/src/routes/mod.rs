pub mod rbac;
pub mod system;
