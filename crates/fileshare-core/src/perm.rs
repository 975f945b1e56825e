//! Owner/other permission bits and the access checks built on them.
//!
//! Permissions are stored as a 9-bit Unix-style value: 3 bits per scope,
//! shifted the same way `chmod` octal digits are (owner at bits 6-8, group
//! at bits 3-5, other at bits 0-2). The group scope exists only to keep the
//! bit layout familiar; this server has no group concept, so group bits are
//! never read when checking access (see [`Access::check`]).

use crate::error::PermissionError;

/// Read bit within a 3-bit permission scope.
pub const PERM_READ: u32 = 0b100;
/// Write bit within a 3-bit permission scope.
pub const PERM_WRITE: u32 = 0b010;
/// Execute bit within a 3-bit permission scope.
pub const PERM_EXECUTE: u32 = 0b001;

const OWNER_SHIFT: u32 = 6;
const GROUP_SHIFT: u32 = 3;
const OTHER_SHIFT: u32 = 0;

/// The kind of access being requested, mirroring the handler category that
/// needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Download, list-dir, file-info, search.
    Read,
    /// Upload, mkdir, delete, chmod.
    Write,
    /// Change-dir (entering a directory).
    Execute,
}

impl Access {
    const fn bit(self) -> u32 {
        match self {
            Self::Read => PERM_READ,
            Self::Write => PERM_WRITE,
            Self::Execute => PERM_EXECUTE,
        }
    }

    /// Check whether `perm_bits` (a 3-bit scope value) grants this access.
    #[must_use]
    pub const fn check(self, perm_bits: u32) -> bool {
        perm_bits & self.bit() != 0
    }
}

fn scope_bits(permissions: u32, shift: u32) -> u32 {
    (permissions >> shift) & 0x7
}

/// Extract the owner scope's 3 bits from a full permission value.
#[must_use]
pub const fn owner_bits(permissions: u32) -> u32 {
    (permissions >> OWNER_SHIFT) & 0x7
}

/// Extract the other scope's 3 bits from a full permission value.
#[must_use]
pub const fn other_bits(permissions: u32) -> u32 {
    (permissions >> OTHER_SHIFT) & 0x7
}

/// Decide whether `requester_id` may perform `access` on a file owned by
/// `owner_id` with permission bits `permissions`.
///
/// File id 0 (the share root) is accessible to every authenticated user
/// regardless of bits, matching the original server's root-directory
/// special case. Callers are expected to have already checked
/// authentication; this function only encodes the bit math.
#[must_use]
pub fn may(requester_id: i64, owner_id: i64, permissions: u32, access: Access) -> bool {
    let scope = if requester_id == owner_id {
        scope_bits(permissions, OWNER_SHIFT)
    } else {
        scope_bits(permissions, OTHER_SHIFT)
    };
    access.check(scope)
}

/// Render permission bits as a 9-character `rwx`-style string.
///
/// The group triplet (middle 3 characters) is always rendered as `---`: the
/// server has no group concept, and unlike the original C implementation
/// (which prints the group scope's raw bits even though nothing ever sets
/// them to anything but zero), this renders the scope as explicitly absent
/// rather than echoing bits that carry no meaning.
#[must_use]
pub fn format_permissions(permissions: u32) -> String {
    let owner = owner_bits(permissions);
    let other = other_bits(permissions);

    let mut out = String::with_capacity(9);
    out.push(if owner & PERM_READ != 0 { 'r' } else { '-' });
    out.push(if owner & PERM_WRITE != 0 { 'w' } else { '-' });
    out.push(if owner & PERM_EXECUTE != 0 { 'x' } else { '-' });
    out.push_str("---");
    out.push(if other & PERM_READ != 0 { 'r' } else { '-' });
    out.push(if other & PERM_WRITE != 0 { 'w' } else { '-' });
    out.push(if other & PERM_EXECUTE != 0 { 'x' } else { '-' });
    out
}

/// Parse a chmod mode string: either exactly 3 octal digits (`"755"`) or a
/// plain decimal integer, matching the two forms the original CLI accepted.
///
/// # Errors
///
/// [`PermissionError::InvalidMode`] if the string is neither form, or an
/// octal digit is out of `0..=7`.
pub fn parse_permissions(mode: &str) -> Result<u32, PermissionError> {
    if mode.len() == 3 && mode.bytes().all(|b| b.is_ascii_digit()) {
        let digits: Vec<u32> = mode.bytes().map(|b| u32::from(b - b'0')).collect();
        if digits.iter().any(|&d| d > 7) {
            return Err(PermissionError::InvalidMode(mode.to_string()));
        }
        return Ok((digits[0] << OWNER_SHIFT) | (digits[1] << GROUP_SHIFT) | (digits[2] << OTHER_SHIFT));
    }

    mode.parse::<u32>().map_err(|_| PermissionError::InvalidMode(mode.to_string()))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn owner_gets_owner_scope() {
        let perms = parse_permissions("640").expect("parse");
        assert!(may(1, 1, perms, Access::Read));
        assert!(may(1, 1, perms, Access::Write));
        assert!(!may(1, 1, perms, Access::Execute));
    }

    #[test]
    fn non_owner_gets_other_scope() {
        let perms = parse_permissions("640").expect("parse");
        assert!(!may(2, 1, perms, Access::Read));
        assert!(!may(2, 1, perms, Access::Write));
    }

    #[test]
    fn format_renders_group_as_absent() {
        let perms = parse_permissions("755").expect("parse");
        assert_eq!(format_permissions(perms), "rwx---r-x");
    }

    #[test]
    fn parse_rejects_bad_octal_digit() {
        assert!(matches!(parse_permissions("789"), Err(PermissionError::InvalidMode(_))));
    }

    #[test]
    fn parse_accepts_plain_integer() {
        assert_eq!(parse_permissions("493").expect("parse"), 493);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_permissions("not-a-mode").is_err());
    }

    proptest! {
        #[test]
        fn octal_round_trips_through_owner_and_other_bits(o in 0u32..=7, g in 0u32..=7, t in 0u32..=7) {
            let mode = format!("{o}{g}{t}");
            let parsed = parse_permissions(&mode).expect("valid octal");
            prop_assert_eq!(owner_bits(parsed), o);
            prop_assert_eq!(other_bits(parsed), t);
        }
    }
}
