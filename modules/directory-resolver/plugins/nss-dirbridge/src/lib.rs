#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! NSS `passwd` module backed by the dirbridge directory service.
//!
//! glibc loads `libnss_dirbridge.so.2` for databases listing `dirbridge` in
//! `nsswitch.conf`. The exported entry points live in `ffi`; everything they
//! decide is computed by [`resolve_passwd`], which only sees safe slices and
//! an [`IdentityDirectory`].
//!
//! Status mapping:
//!
//! | Outcome                                   | Status     | errno    |
//! |-------------------------------------------|------------|----------|
//! | identity found and packed                 | `SUCCESS`  | -        |
//! | not found, malformed or failed response   | `NOTFOUND` | `ENOENT` |
//! | configuration or runtime failure          | `UNAVAIL`  | `ENOENT` |
//! | caller buffer too small                   | `UNAVAIL`  | `ERANGE` |

#[cfg(target_os = "linux")]
mod ffi;

use directory_resolver::{PackedOffsets, PasswdConfig, PasswdEntry};
use directory_resolver_sdk::{DirectoryError, IdentityDirectory, Lookup};

/// `enum nss_status` from `<nss.h>`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NssStatus {
    TryAgain = -2,
    Unavail = -1,
    NotFound = 0,
    Success = 1,
}

impl NssStatus {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Which user to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswdKey<'a> {
    Name(&'a str),
    Id(u32),
}

/// A record packed into the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedPasswd {
    pub uid: u32,
    pub gid: u32,
    pub offsets: PackedOffsets,
}

/// Status and errno reported for a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NssFailure {
    pub status: NssStatus,
    pub errno: i32,
}

impl NssFailure {
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            status: NssStatus::NotFound,
            errno: libc::ENOENT,
        }
    }

    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            status: NssStatus::Unavail,
            errno: libc::ENOENT,
        }
    }

    #[must_use]
    pub const fn buffer_too_small() -> Self {
        Self {
            status: NssStatus::Unavail,
            errno: libc::ERANGE,
        }
    }
}

impl From<&DirectoryError> for NssFailure {
    fn from(err: &DirectoryError) -> Self {
        match err {
            DirectoryError::Configuration(_) | DirectoryError::Runtime(_) => Self::unavailable(),
            DirectoryError::Transport(_)
            | DirectoryError::Decode(_)
            | DirectoryError::BufferOverflow { .. } => Self::not_found(),
        }
    }
}

/// Resolve `key` and pack the `passwd` strings into `buf`.
///
/// `buf` is written only on success.
///
/// # Errors
///
/// Returns the NSS status and errno to report; see the crate docs for the mapping.
pub fn resolve_passwd(
    directory: &dyn IdentityDirectory,
    layout: &PasswdConfig,
    key: PasswdKey<'_>,
    buf: &mut [u8],
) -> Result<PackedPasswd, NssFailure> {
    let lookup = match key {
        PasswdKey::Name(name) => directory.resolve_by_name(name),
        PasswdKey::Id(uid) => directory.resolve_by_id(uid),
    };

    let identity = match lookup {
        Ok(Lookup::Found(identity)) => identity,
        Ok(Lookup::NotFound) => return Err(NssFailure::not_found()),
        Err(e) => {
            tracing::warn!(key = ?key, error = %e, "passwd lookup failed");
            return Err(NssFailure::from(&e));
        }
    };

    let entry = PasswdEntry::from_identity(&identity, layout);
    match entry.pack_into(buf) {
        Ok(offsets) => Ok(PackedPasswd {
            uid: entry.uid,
            gid: entry.gid,
            offsets,
        }),
        Err(DirectoryError::BufferOverflow { capacity }) => {
            tracing::debug!(
                capacity,
                needed = entry.packed_len(),
                "caller buffer too small for passwd entry"
            );
            Err(NssFailure::buffer_too_small())
        }
        Err(e) => {
            tracing::warn!(key = ?key, error = %e, "passwd entry rejected");
            Err(NssFailure::not_found())
        }
    }
}
