//! Byte ↔ base conversion, two bits per base, most significant pair first.

use thiserror::Error;

use crate::alphabet::Base;

/// Assignment of 2-bit values to bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseOrder {
    /// 00=A, 01=C, 10=G, 11=T.
    #[default]
    Acgt,
    /// 00=A, 01=T, 10=C, 11=G. Used by the one-time pad.
    Atcg,
}

impl BaseOrder {
    const fn table(self) -> [Base; 4] {
        match self {
            BaseOrder::Acgt => [Base::A, Base::C, Base::G, Base::T],
            BaseOrder::Atcg => [Base::A, Base::T, Base::C, Base::G],
        }
    }

    /// Base for the low two bits of `bits`.
    pub fn base(self, bits: u8) -> Base {
        self.table()[(bits & 0b11) as usize]
    }

    /// 2-bit value of a base.
    pub fn bits(self, base: Base) -> u8 {
        match (self, base) {
            (_, Base::A) => 0,
            (BaseOrder::Acgt, Base::C) | (BaseOrder::Atcg, Base::T) => 1,
            (BaseOrder::Acgt, Base::G) | (BaseOrder::Atcg, Base::C) => 2,
            (BaseOrder::Acgt, Base::T) | (BaseOrder::Atcg, Base::G) => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("invalid base '{found}' at position {position}")]
    InvalidBase { position: usize, found: char },

    #[error("{0} trailing bases do not make a whole byte")]
    TrailingBases(usize),

    #[error("sequence lengths differ ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("key is too short: needs {needed} bases, has {available}")]
    KeyTooShort { needed: usize, available: usize },
}

/// Convert bytes to bases, four per byte.
pub fn pack_bytes(bytes: &[u8], order: BaseOrder) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for &b in bytes {
        for shift in [6, 4, 2, 0] {
            out.push(order.base(b >> shift).as_char());
        }
    }
    out
}

/// Parse one base character, case-insensitively.
pub fn parse_base(c: char, position: usize) -> Result<Base, PackError> {
    Base::from_char(c.to_ascii_uppercase()).ok_or(PackError::InvalidBase { position, found: c })
}

/// Convert bases back to bytes. Spaces and line breaks are skipped.
pub fn unpack_bases(sequence: &str, order: BaseOrder) -> Result<Vec<u8>, PackError> {
    let mut out = Vec::with_capacity(sequence.len() / 4);
    let mut current = 0u8;
    let mut pending = 0usize;
    for (position, c) in sequence.chars().enumerate() {
        if matches!(c, ' ' | '\n' | '\r') {
            continue;
        }
        let base = parse_base(c, position)?;
        current = (current << 2) | order.bits(base);
        pending += 1;
        if pending == 4 {
            out.push(current);
            current = 0;
            pending = 0;
        }
    }
    if pending != 0 {
        return Err(PackError::TrailingBases(pending));
    }
    Ok(out)
}

/// Break a sequence into lines of `width` characters, each ending in `\n`.
/// A width of 0 returns the sequence unchanged.
pub fn wrap_lines(sequence: &str, width: usize) -> String {
    if width == 0 {
        return sequence.to_string();
    }
    let mut out = String::with_capacity(sequence.len() + sequence.len() / width + 1);
    let mut in_line = 0;
    for c in sequence.chars() {
        out.push(c);
        in_line += 1;
        if in_line == width {
            out.push('\n');
            in_line = 0;
        }
    }
    if in_line > 0 {
        out.push('\n');
    }
    out
}
