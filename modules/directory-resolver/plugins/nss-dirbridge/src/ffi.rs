//! Exported glibc NSS entry points.
#![allow(unsafe_code)]

use std::ffi::CStr;
use std::panic::{AssertUnwindSafe, catch_unwind};

use directory_resolver::{DEFAULT_CONFIG_PATH, DirectoryBridge, DirectoryConfig};
use libc::{c_char, c_int, passwd, size_t};

use crate::{NssFailure, NssStatus, PackedPasswd, PasswdKey, resolve_passwd};

/// Store `value` through `errnop` when the caller passed one.
unsafe fn set_errno(errnop: *mut c_int, value: c_int) {
    if !errnop.is_null() {
        // SAFETY: non-null errnop points to the caller's errno slot.
        unsafe { *errnop = value };
    }
}

/// Resolve `key` into `result`/`buffer` and return the NSS status code.
///
/// # Safety
///
/// `result` must be null or valid for writes; `buffer` must be null or valid
/// for `buflen` bytes of writes; `errnop` must be null or valid for writes.
unsafe fn getpw(
    key: PasswdKey<'_>,
    result: *mut passwd,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
) -> c_int {
    if result.is_null() || buffer.is_null() {
        // SAFETY: forwarded caller contract.
        unsafe { set_errno(errnop, libc::EINVAL) };
        return NssStatus::Unavail.code();
    }

    // SAFETY: buffer is non-null and the caller guarantees `buflen` writable bytes.
    let buf = unsafe { std::slice::from_raw_parts_mut(buffer.cast::<u8>(), buflen) };

    let outcome = catch_unwind(AssertUnwindSafe(|| lookup(key, buf)))
        .unwrap_or_else(|_| Err(NssFailure::unavailable()));

    match outcome {
        Ok(packed) => {
            // SAFETY: result is non-null and writable; every offset lies inside `buffer`.
            unsafe { fill_passwd(result, buffer, &packed) };
            NssStatus::Success.code()
        }
        Err(failure) => {
            // SAFETY: forwarded caller contract.
            unsafe { set_errno(errnop, failure.errno) };
            failure.status.code()
        }
    }
}

fn lookup(key: PasswdKey<'_>, buf: &mut [u8]) -> Result<PackedPasswd, NssFailure> {
    // One read of the file serves both the layout and the bridge.
    let config = DirectoryConfig::load(DEFAULT_CONFIG_PATH).map_err(|_| NssFailure::unavailable())?;
    let layout = config.passwd.clone();
    let bridge = DirectoryBridge::with_config(config);
    resolve_passwd(&bridge, &layout, key, buf)
}

/// # Safety
///
/// `result` must be valid for writes and `buffer` must hold the packed strings
/// at the offsets in `packed`.
unsafe fn fill_passwd(result: *mut passwd, buffer: *mut c_char, packed: &PackedPasswd) {
    let offsets = packed.offsets;
    // SAFETY: guaranteed by the caller.
    unsafe {
        let pw = &mut *result;
        pw.pw_name = buffer.add(offsets.name);
        pw.pw_passwd = buffer.add(offsets.passwd);
        pw.pw_uid = packed.uid;
        pw.pw_gid = packed.gid;
        pw.pw_gecos = buffer.add(offsets.gecos);
        pw.pw_dir = buffer.add(offsets.dir);
        pw.pw_shell = buffer.add(offsets.shell);
    }
}

/// `getpwnam_r` backend.
///
/// # Safety
///
/// Called by glibc with a NUL-terminated `name`, a writable `result`, a
/// `buffer` of `buflen` bytes and a writable `errnop`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn _nss_dirbridge_getpwnam_r(
    name: *const c_char,
    result: *mut passwd,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
) -> c_int {
    if name.is_null() {
        // SAFETY: caller contract.
        unsafe { set_errno(errnop, libc::EINVAL) };
        return NssStatus::Unavail.code();
    }

    // SAFETY: name is non-null and NUL-terminated per the caller contract.
    let Ok(name) = unsafe { CStr::from_ptr(name) }.to_str() else {
        // SAFETY: caller contract.
        unsafe { set_errno(errnop, libc::ENOENT) };
        return NssStatus::NotFound.code();
    };

    // SAFETY: caller contract.
    unsafe { getpw(PasswdKey::Name(name), result, buffer, buflen, errnop) }
}

/// `getpwuid_r` backend.
///
/// # Safety
///
/// Called by glibc with a writable `result`, a `buffer` of `buflen` bytes and
/// a writable `errnop`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn _nss_dirbridge_getpwuid_r(
    uid: libc::uid_t,
    result: *mut passwd,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
) -> c_int {
    // SAFETY: caller contract.
    unsafe { getpw(PasswdKey::Id(uid), result, buffer, buflen, errnop) }
}

/// Enumeration is not supported; opening it always succeeds.
#[unsafe(no_mangle)]
pub extern "C" fn _nss_dirbridge_setpwent(_stayopen: c_int) -> c_int {
    NssStatus::Success.code()
}

#[unsafe(no_mangle)]
pub extern "C" fn _nss_dirbridge_endpwent() -> c_int {
    NssStatus::Success.code()
}

/// Enumeration yields no entries.
///
/// # Safety
///
/// `errnop` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn _nss_dirbridge_getpwent_r(
    _result: *mut passwd,
    _buffer: *mut c_char,
    _buflen: size_t,
    errnop: *mut c_int,
) -> c_int {
    // SAFETY: caller contract.
    unsafe { set_errno(errnop, libc::ENOENT) };
    NssStatus::NotFound.code()
}
