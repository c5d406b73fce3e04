//! SeaORM entity definitions for PostgreSQL database.

pub mod bug;
pub mod custom_test_type;
pub mod notification;
pub mod organization;
pub mod project;
pub mod project_user;
pub mod script;
pub mod test_case;
pub mod test_scenario;
pub mod user;
