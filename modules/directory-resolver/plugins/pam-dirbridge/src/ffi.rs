//! Exported PAM service-module entry points.
//!
//! `pam_get_user` and `pam_get_authtok` are resolved at load time from the
//! libpam already mapped into the host process.
#![allow(unsafe_code)]

use std::ffi::CStr;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;

use directory_resolver::DirectoryBridge;
use directory_resolver_sdk::Password;
use libc::{c_char, c_int};

use crate::{ModuleOptions, PAM_AUTHTOK, PamCode, account_status, authenticate_user};

/// Opaque `pam_handle_t`.
#[repr(C)]
pub struct PamHandle {
    _private: [u8; 0],
}

unsafe extern "C" {
    fn pam_get_user(pamh: *mut PamHandle, user: *mut *const c_char, prompt: *const c_char)
    -> c_int;

    fn pam_get_authtok(
        pamh: *mut PamHandle,
        item: c_int,
        authtok: *mut *const c_char,
        prompt: *const c_char,
    ) -> c_int;
}

/// Borrow a C string as UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string outliving `'a`.
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// # Safety
///
/// `argv` must be null or hold `argc` valid C strings.
unsafe fn module_options(argc: c_int, argv: *const *const c_char) -> ModuleOptions {
    let count = usize::try_from(argc).unwrap_or(0);
    if argv.is_null() || count == 0 {
        return ModuleOptions::default();
    }
    // SAFETY: argv holds argc entries per the caller contract.
    let args = unsafe { std::slice::from_raw_parts(argv, count) };
    // SAFETY: each entry is a valid C string per the caller contract.
    ModuleOptions::parse(args.iter().filter_map(|arg| unsafe { c_str(*arg) }))
}

/// # Safety
///
/// `pamh` must be a live PAM handle.
unsafe fn get_user<'a>(pamh: *mut PamHandle) -> Option<&'a str> {
    let mut user: *const c_char = ptr::null();
    // SAFETY: pamh is live; user is a valid out-pointer.
    let rc = unsafe { pam_get_user(pamh, &raw mut user, ptr::null()) };
    if rc != PamCode::Success.code() {
        return None;
    }
    // SAFETY: on success libpam returns a string owned by the handle.
    unsafe { c_str(user) }
}

/// # Safety
///
/// `pamh` must be a live PAM handle.
unsafe fn get_password(pamh: *mut PamHandle) -> Option<Password> {
    let mut token: *const c_char = ptr::null();
    // SAFETY: pamh is live; token is a valid out-pointer.
    let rc = unsafe { pam_get_authtok(pamh, PAM_AUTHTOK, &raw mut token, ptr::null()) };
    if rc != PamCode::Success.code() {
        return None;
    }
    // SAFETY: on success libpam returns a string owned by the handle.
    unsafe { c_str(token) }.map(Password::new)
}

fn guarded(f: impl FnOnce() -> PamCode) -> c_int {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or(PamCode::AuthErr)
        .code()
}

/// # Safety
///
/// Called by libpam with a live handle and its module arguments.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pam_sm_authenticate(
    pamh: *mut PamHandle,
    _flags: c_int,
    argc: c_int,
    argv: *const *const c_char,
) -> c_int {
    if pamh.is_null() {
        return PamCode::AuthErr.code();
    }
    guarded(|| {
        // SAFETY: caller contract.
        let options = unsafe { module_options(argc, argv) };
        // SAFETY: caller contract.
        let user = unsafe { get_user(pamh) };
        // SAFETY: caller contract.
        let password = unsafe { get_password(pamh) };

        let bridge = DirectoryBridge::from_path(options.config_path);
        authenticate_user(&bridge, user, password.as_ref())
    })
}

/// Credentials are not managed by this module.
#[unsafe(no_mangle)]
pub extern "C" fn pam_sm_setcred(
    _pamh: *mut PamHandle,
    _flags: c_int,
    _argc: c_int,
    _argv: *const *const c_char,
) -> c_int {
    PamCode::Success.code()
}

/// # Safety
///
/// Called by libpam with a live handle and its module arguments.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pam_sm_acct_mgmt(
    pamh: *mut PamHandle,
    _flags: c_int,
    argc: c_int,
    argv: *const *const c_char,
) -> c_int {
    if pamh.is_null() {
        return PamCode::AuthErr.code();
    }
    guarded(|| {
        // SAFETY: caller contract.
        let options = unsafe { module_options(argc, argv) };
        // SAFETY: caller contract.
        let user = unsafe { get_user(pamh) };

        let bridge = DirectoryBridge::from_path(options.config_path);
        account_status(&bridge, user)
    })
}
