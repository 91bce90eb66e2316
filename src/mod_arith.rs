use num::{CheckedAdd, CheckedSub, Num};
use std::ops::Rem;

/// Registers hold 15-bit values.
pub const MODULUS: u16 = 32768;

pub fn mod_add<T>(a: &T, b: &T, m: T) -> Option<T>
    where T: CheckedAdd + Rem<Output = T>
{
    a.checked_add(b).map(|ab| ab % m)
}

pub fn checked_dec<T>(a: &T) -> Option<T>
    where T: CheckedSub + Num
{
    a.checked_sub(&T::one())
}

/// `(v + 1) mod 32768` for any `u16`.
pub fn reg_inc(v: u16) -> u16 {
    // u32 cannot overflow here and the result is below MODULUS
    mod_add(&u32::from(v), &1, u32::from(MODULUS)).map_or(0, |w| w as u16)
}

pub fn is_register(v: u16) -> bool {
    v < MODULUS
}
