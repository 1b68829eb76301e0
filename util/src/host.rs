//! Host platform (linux for example) utility functions

use std::path::PathBuf;
use uname;

/// Name of the environment variable pointing at the root of the drive software checkout.
pub const SW_ROOT_ENV_VAR: &str = "DRIVE_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the software root directory from the `DRIVE_SW_ROOT` environment variable.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
