#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! PAM module backed by the dirbridge directory service.
//!
//! ```text
//! auth     sufficient  pam_dirbridge.so
//! account  sufficient  pam_dirbridge.so config=/etc/dirbridge.conf
//! ```
//!
//! The exported `pam_sm_*` functions live in `ffi`. Their decisions are made
//! by [`authenticate_user`] and [`account_status`], which only see safe values
//! and an [`IdentityDirectory`]. A denied login looks the same whatever the
//! cause; details go to the log file only.

#[cfg(all(target_os = "linux", not(test)))]
mod ffi;

use std::path::PathBuf;

use directory_resolver::DEFAULT_CONFIG_PATH;
use directory_resolver_sdk::{AuthResult, IdentityDirectory, Lookup, Password};

/// Return codes from `<security/_pam_types.h>`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PamCode {
    Success = 0,
    AuthErr = 7,
    UserUnknown = 10,
}

impl PamCode {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// `PAM_AUTHTOK` item type for `pam_get_authtok`.
pub const PAM_AUTHTOK: i32 = 6;

/// Options taken from the module arguments in `/etc/pam.d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOptions {
    pub config_path: PathBuf,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl ModuleOptions {
    /// Parse `key=value` module arguments. Unknown arguments are ignored.
    #[must_use]
    pub fn parse<'a>(args: impl IntoIterator<Item = &'a str>) -> Self {
        let mut options = Self::default();
        for arg in args {
            match arg.split_once('=') {
                Some(("config", path)) if !path.is_empty() => {
                    options.config_path = PathBuf::from(path);
                }
                _ => tracing::debug!(arg, "ignoring unknown module argument"),
            }
        }
        options
    }
}

/// Decide `pam_sm_authenticate`.
///
/// Only [`AuthResult::Authenticated`] succeeds. A missing user or token, an
/// unconfigured endpoint and any service failure are all `AuthErr`.
#[must_use]
pub fn authenticate_user(
    directory: &dyn IdentityDirectory,
    user: Option<&str>,
    password: Option<&Password>,
) -> PamCode {
    let (Some(user), Some(password)) = (user.filter(|u| !u.is_empty()), password) else {
        tracing::debug!("no user or authentication token");
        return PamCode::AuthErr;
    };

    match directory.authenticate(user, password) {
        Ok(AuthResult::Authenticated) => PamCode::Success,
        Ok(result) => {
            tracing::info!(user, result = ?result, "authentication rejected");
            PamCode::AuthErr
        }
        Err(e) => {
            tracing::warn!(user, error = %e, "authentication unavailable");
            PamCode::AuthErr
        }
    }
}

/// Decide `pam_sm_acct_mgmt`: the account exists if the directory knows the user.
#[must_use]
pub fn account_status(directory: &dyn IdentityDirectory, user: Option<&str>) -> PamCode {
    let Some(user) = user.filter(|u| !u.is_empty()) else {
        return PamCode::UserUnknown;
    };

    match directory.resolve_by_name(user) {
        Ok(Lookup::Found(_)) => PamCode::Success,
        Ok(Lookup::NotFound) => PamCode::UserUnknown,
        Err(e) => {
            tracing::warn!(user, error = %e, "account lookup failed");
            PamCode::AuthErr
        }
    }
}
