//! Random value writers.
//!
//! Each writer renders straight into an existing `String`, reusing its
//! capacity, so refilling a pooled record does not allocate once the slot's
//! buffers have grown to size.

use rand::Rng;
use std::fmt::Write;

/// Highest client port handed out (exclusive).
pub const CLIENT_PORT_LIMIT: u32 = 65_535;

/// Replace the contents of `field` with `value`.
pub fn set_str(field: &mut String, value: &str) {
    field.clear();
    field.push_str(value);
}

/// Replace the contents of `field` with the decimal rendering of `value`.
pub fn set_display<T: std::fmt::Display>(field: &mut String, value: T) {
    field.clear();
    // Writing into a String cannot fail.
    let _ = write!(field, "{value}");
}

/// Write a random dotted IPv4 address.
pub fn set_ipv4<R: Rng + ?Sized>(field: &mut String, rng: &mut R) {
    let [a, b, c, d]: [u8; 4] = rng.gen();
    field.clear();
    let _ = write!(field, "{a}.{b}.{c}.{d}");
}

/// Write a random non-negative 63-bit integer, as used for flow and
/// sequence identifiers.
pub fn set_int63<R: Rng + ?Sized>(field: &mut String, rng: &mut R) {
    set_display(field, rng.gen_range(0..=i64::MAX));
}

/// Write a random client port in `0..CLIENT_PORT_LIMIT`.
pub fn set_port<R: Rng + ?Sized>(field: &mut String, rng: &mut R) {
    set_display(field, rng.gen_range(0..CLIENT_PORT_LIMIT));
}

/// Write `"0"` or `"1"`.
pub fn set_flag<R: Rng + ?Sized>(field: &mut String, rng: &mut R) {
    set_str(field, if rng.gen_bool(0.5) { "1" } else { "0" });
}
