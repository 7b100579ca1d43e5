//! Three-valued logic signals.
//!
//! A [`Signal`] is an immutable-by-convention bit vector in three-valued
//! logic {0, 1, X}, packed for efficient storage and cheap equality. It is
//! the value type carried on every gate port and in every update message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single three-state logic value.
///
/// - `Zero` — logic low (driven 0)
/// - `One` — logic high (driven 1)
/// - `X` — unknown or undriven
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown.
    X = 2,
}

impl Logic {
    /// Converts a character to a [`Logic`] value.
    ///
    /// Accepts '0', '1' and 'x'/'X'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            _ => None,
        }
    }

    /// Converts a boolean to `Zero`/`One`.
    pub fn from_bool(value: bool) -> Self {
        if value {
            Logic::One
        } else {
            Logic::Zero
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "X"),
        }
    }
}

/// AND truth table: zero dominates, X otherwise.
/// ```text
///     0  1  X
/// 0 | 0  0  0
/// 1 | 0  1  X
/// X | 0  X  X
/// ```
impl BitAnd for Logic {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, _) | (_, Zero) => Zero,
            (One, One) => One,
            _ => X,
        }
    }
}

/// OR truth table: one dominates, X otherwise.
/// ```text
///     0  1  X
/// 0 | 0  1  X
/// 1 | 1  1  1
/// X | X  1  X
/// ```
impl BitOr for Logic {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (One, _) | (_, One) => One,
            (Zero, Zero) => Zero,
            _ => X,
        }
    }
}

/// XOR truth table: any X contaminates.
impl BitXor for Logic {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, Zero) | (One, One) => Zero,
            (Zero, One) | (One, Zero) => One,
            _ => X,
        }
    }
}

/// NOT: `!0 = 1`, `!1 = 0`, `!X = X`.
impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        use Logic::*;
        match self {
            Zero => One,
            One => Zero,
            X => X,
        }
    }
}

/// A fixed-width vector of three-state [`Logic`] values.
///
/// Each value occupies 2 bits, with 32 values packed per `u64` word.
/// Equality is structural, which is what the propagation rules use for
/// their change short-circuit.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    width: u32,
    /// Packed storage: 2 bits per logic value, 32 values per u64.
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

fn word_count(width: u32) -> usize {
    (width as usize).div_ceil(VALUES_PER_WORD as usize)
}

impl Signal {
    /// Creates a new `Signal` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Creates a `Signal` with every bit unknown (all-X).
    ///
    /// This is the value delivered to an input whose driving link has been
    /// removed, and the default initial value for unspecified ports.
    pub fn undefined(width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            v.set(i, Logic::X);
        }
        v
    }

    /// Creates a single-bit `Signal` from a boolean value.
    pub fn from_bool(value: bool) -> Self {
        let mut v = Self::new(1);
        if value {
            v.set(0, Logic::One);
        }
        v
    }

    /// Creates a `Signal` from a `u64` value with the given width.
    ///
    /// Bits beyond the given width are ignored.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Parses a binary string like `"10X"` into a `Signal`.
    ///
    /// The leftmost character is the most significant bit (highest index).
    /// Returns `None` if the string contains invalid characters.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let width = s.len() as u32;
        let mut v = Self::new(width);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Logic::from_char(c)?);
        }
        Some(v)
    }

    /// Returns the number of logic values in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        match (self.data[word_idx] >> bit_offset) & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            _ => Logic::X,
        }
    }

    /// Sets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// Converts the `Signal` to a `u64`, if all bits are definite (0 or 1).
    ///
    /// Returns `None` if the vector contains X values or if the width
    /// exceeds 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X => return None,
            }
        }
        Some(result)
    }

    /// Returns true if no bit is X.
    pub fn is_fully_defined(&self) -> bool {
        (0..self.width).all(|i| self.get(i) != Logic::X)
    }

    /// Returns true if all bits are `Logic::X`.
    pub fn is_fully_undefined(&self) -> bool {
        (0..self.width).all(|i| self.get(i) == Logic::X)
    }

    /// Applies a unary operation bit by bit.
    pub fn map(&self, op: impl Fn(Logic) -> Logic) -> Signal {
        let mut result = Signal::new(self.width);
        for i in 0..self.width {
            result.set(i, op(self.get(i)));
        }
        result
    }

    /// Applies a binary operation bit by bit.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn zip_map(&self, rhs: &Signal, op: impl Fn(Logic, Logic) -> Logic) -> Signal {
        assert_eq!(self.width, rhs.width, "signal width mismatch");
        let mut result = Signal::new(self.width);
        for i in 0..self.width {
            result.set(i, op(self.get(i), rhs.get(i)));
        }
        result
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({self})")
    }
}

impl BitAnd for &Signal {
    type Output = Signal;

    fn bitand(self, rhs: Self) -> Signal {
        self.zip_map(rhs, |a, b| a & b)
    }
}

impl BitOr for &Signal {
    type Output = Signal;

    fn bitor(self, rhs: Self) -> Signal {
        self.zip_map(rhs, |a, b| a | b)
    }
}

impl BitXor for &Signal {
    type Output = Signal;

    fn bitxor(self, rhs: Self) -> Signal {
        self.zip_map(rhs, |a, b| a ^ b)
    }
}

impl Not for &Signal {
    type Output = Signal;

    fn not(self) -> Signal {
        self.map(|a| !a)
    }
}
