//! `passwd` records for resolved identities.
//!
//! NSS callers hand over one fixed buffer that must hold every string of the
//! record. [`PasswdEntry::pack_into`] lays the strings out NUL-terminated and
//! back to back, after checking that all of them fit.

use std::fmt;

use directory_resolver_sdk::{DirectoryError, ResolvedIdentity};

use crate::config::PasswdConfig;

/// Placeholder in the password field; the real check goes through PAM.
pub const PASSWORD_PLACEHOLDER: &str = "x";

/// A complete `passwd` record. The group id equals the user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub passwd: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub dir: String,
    pub shell: String,
}

/// Byte offsets of each NUL-terminated field inside a packed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedOffsets {
    pub name: usize,
    pub passwd: usize,
    pub gecos: usize,
    pub dir: usize,
    pub shell: usize,
}

impl PasswdEntry {
    #[must_use]
    pub fn from_identity(identity: &ResolvedIdentity, layout: &PasswdConfig) -> Self {
        let base = layout.home_base.trim_end_matches('/');
        Self {
            name: identity.name().to_owned(),
            passwd: PASSWORD_PLACEHOLDER.to_owned(),
            uid: identity.numeric_id(),
            gid: identity.numeric_id(),
            gecos: layout.gecos.clone(),
            dir: format!("{base}/{}", identity.name()),
            shell: layout.shell.clone(),
        }
    }

    fn fields(&self) -> [&str; 5] {
        [
            &self.name,
            &self.passwd,
            &self.gecos,
            &self.dir,
            &self.shell,
        ]
    }

    /// Bytes needed to pack every field with its terminator.
    #[must_use]
    pub fn packed_len(&self) -> usize {
        self.fields().iter().map(|f| f.len() + 1).sum()
    }

    /// Pack all string fields into `buf`.
    ///
    /// # Errors
    ///
    /// - `BufferOverflow` if `buf` is shorter than [`packed_len`](Self::packed_len);
    ///   `buf` is left untouched
    /// - `Decode` if a field contains an interior NUL
    pub fn pack_into(&self, buf: &mut [u8]) -> Result<PackedOffsets, DirectoryError> {
        let fields = self.fields();
        if fields.iter().any(|f| f.as_bytes().contains(&0)) {
            return Err(DirectoryError::Decode(
                "passwd field contains a NUL byte".to_owned(),
            ));
        }
        if buf.len() < self.packed_len() {
            return Err(DirectoryError::BufferOverflow {
                capacity: buf.len(),
            });
        }

        let mut offsets = [0_usize; 5];
        let mut pos = 0;
        for (offset, field) in offsets.iter_mut().zip(fields) {
            let end = pos + field.len();
            buf[pos..end].copy_from_slice(field.as_bytes());
            buf[end] = 0;
            *offset = pos;
            pos = end + 1;
        }

        let [name, passwd, gecos, dir, shell] = offsets;
        Ok(PackedOffsets {
            name,
            passwd,
            gecos,
            dir,
            shell,
        })
    }
}

/// `passwd(5)` line form: `name:x:uid:gid:gecos:dir:shell`.
impl fmt::Display for PasswdEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}:{}",
            self.name, self.passwd, self.uid, self.gid, self.gecos, self.dir, self.shell
        )
    }
}
