//! Legacy identity mapping.
//!
//! Every legacy integer id `k` maps to exactly one UUID so canonical-store
//! code can address legacy records without seeing integer keys. The mapping
//! is a wire format: it must stay stable across releases and runtimes.
//!
//! Layout (big-endian, 128 bits):
//!
//! ```text
//! | 32 bits: 0x6E776E64 ("nwnd") | 64 bits: zero | 32 bits: id as u32 |
//! ```
//!
//! Random v4 UUIDs carry a version nibble of 4 in byte 6, which the zero
//! middle region never does, so derived ids cannot collide with generated ones.

use uuid::Uuid;

const LEGACY_PREFIX: u128 = 0x6E77_6E64 << 96;
const PREFIX_MASK: u128 = !(u32::MAX as u128);

/// Map a legacy integer id to its canonical identifier.
pub fn to_guid(id: i32) -> Uuid {
    Uuid::from_u128(LEGACY_PREFIX | u128::from(id as u32))
}

/// Recover the legacy integer id, if `id` was produced by [`to_guid`].
pub fn to_legacy_id(id: Uuid) -> Option<i32> {
    let value = id.as_u128();
    if value & PREFIX_MASK == LEGACY_PREFIX {
        Some(value as u32 as i32)
    } else {
        None
    }
}

/// Whether `id` addresses a legacy-origin record.
pub fn is_legacy_derived(id: Uuid) -> bool {
    to_legacy_id(id).is_some()
}
