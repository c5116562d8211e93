//! Business services
//!
//! - [`FileStore`] - uploads, presigned URIs and object cleanup
//! - [`StaffDirectory`] - staff registration and maintenance
//! - [`ScheduleCatalog`] - shift schedules and assignment
//! - [`Attendance`] - clock-in / clock-out policy
//! - [`superuser`] - administrator bootstrap

pub mod attendance;
pub mod file_store;
pub mod schedule_catalog;
pub mod staff_directory;
pub mod superuser;

pub use attendance::Attendance;
pub use file_store::{FileStore, Upload};
pub use schedule_catalog::ScheduleCatalog;
pub use staff_directory::{StaffDirectory, StaffListing};
