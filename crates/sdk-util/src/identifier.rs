//! Canonical identifiers: random UUIDs in `8-4-4-4-12` hex text.

use rand::RngCore;
use uuid::{Builder, Uuid};

/// Length of the hyphenated textual form.
pub const UUID_STRING_LEN: usize = 36;

/// A fresh random (version 4) UUID from the thread-local CSPRNG.
pub fn new_uuid() -> Uuid {
    new_uuid_with(&mut rand::thread_rng())
}

/// A fresh random (version 4) UUID drawn from `rng`.
pub fn new_uuid_with<R: RngCore + ?Sized>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    Builder::from_random_bytes(bytes).into_uuid()
}

/// A fresh random UUID rendered as uppercase hyphenated text.
///
/// ```
/// let id = telemetry_util::new_uuid_string();
/// assert_eq!(id.len(), 36);
/// assert_ne!(id, telemetry_util::new_uuid_string());
/// ```
pub fn new_uuid_string() -> String {
    uuid_to_string(&new_uuid())
}

pub fn uuid_to_string(id: &Uuid) -> String {
    format!("{:X}", id.hyphenated())
}

/// Parses the hyphenated `8-4-4-4-12` form, in either case.
///
/// Other textual UUID forms (simple, braced, URN) are rejected.
pub fn uuid_from_string(s: &str) -> Option<Uuid> {
    if s.len() != UUID_STRING_LEN {
        return None;
    }
    Uuid::try_parse(s).ok()
}
