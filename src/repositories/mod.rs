pub(crate) mod audit_logs;
pub(crate) mod classes;
pub(crate) mod enrollments;
pub(crate) mod grade_settings;
pub(crate) mod health;
pub(crate) mod materials;
pub(crate) mod submissions;
pub(crate) mod users;
