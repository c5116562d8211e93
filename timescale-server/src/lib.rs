//! TimeScale server - staff, schedules and attendance
//!
//! # Module layout
//!
//! ```text
//! timescale-server/src/
//! ├── core/      # configuration, state, HTTP server
//! ├── auth/      # JWT, principals, access gates
//! ├── services/  # file store, staff directory, schedules, attendance
//! ├── api/       # HTTP routes and handlers
//! ├── db/        # SQLite pool, migrations, repositories
//! ├── storage/   # object storage backends
//! └── utils/     # logging, validation, time, credentials
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod storage;
pub mod utils;

pub use auth::{JwtService, Principal};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;
