use crate::error::CodecError;

/// Padding character used when none is configured.
pub const DEFAULT_PADDING: char = 'N';

/// One of the four data bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Base {
    A,
    T,
    C,
    G,
}

/// All bases in declared order. Classification scans this table front to
/// back, so on equal distance the earlier base wins.
pub const BASES: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];

impl Base {
    /// Grayscale intensity the base is rendered with.
    pub const fn intensity(self) -> u8 {
        match self {
            Base::A => 0,
            Base::T => 64,
            Base::C => 128,
            Base::G => 192,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::C => 'C',
            Base::G => 'G',
        }
    }

    /// Parse an uppercase base letter.
    pub const fn from_char(c: char) -> Option<Base> {
        match c {
            'A' => Some(Base::A),
            'T' => Some(Base::T),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            _ => None,
        }
    }
}

/// A sequence element: a data base or the padding sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Base(Base),
    Padding,
}

impl Symbol {
    pub fn to_char(self, padding: char) -> char {
        match self {
            Symbol::Base(b) => b.as_char(),
            Symbol::Padding => padding,
        }
    }
}

/// Normalize and validate a textual sequence.
///
/// ASCII whitespace is dropped, letters are uppercased, and every remaining
/// character must be a base or the padding character. `position` in the
/// error counts characters of the raw input.
pub fn parse_sequence(input: &str, padding: char) -> Result<Vec<Symbol>, CodecError> {
    let padding = padding.to_ascii_uppercase();
    let mut symbols = Vec::with_capacity(input.len());
    for (position, raw) in input.chars().enumerate() {
        if raw.is_ascii_whitespace() {
            continue;
        }
        let c = raw.to_ascii_uppercase();
        let symbol = match Base::from_char(c) {
            Some(base) => Symbol::Base(base),
            None if c == padding => Symbol::Padding,
            None => return Err(CodecError::InvalidSymbol { position, found: raw }),
        };
        symbols.push(symbol);
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensities_are_distinct_and_ordered() {
        let values: Vec<u8> = BASES.iter().map(|b| b.intensity()).collect();
        assert_eq!(values, vec![0, 64, 128, 192]);
    }

    #[test]
    fn char_conversion_matches() {
        for base in BASES {
            assert_eq!(Base::from_char(base.as_char()), Some(base));
        }
        assert_eq!(Base::from_char('a'), None);
        assert_eq!(Base::from_char('N'), None);
    }

    #[test]
    fn parse_uppercases_and_skips_whitespace() {
        let symbols = parse_sequence("  at\ncg\r\n", DEFAULT_PADDING).unwrap();
        assert_eq!(
            symbols,
            vec![
                Symbol::Base(Base::A),
                Symbol::Base(Base::T),
                Symbol::Base(Base::C),
                Symbol::Base(Base::G),
            ]
        );
    }

    #[test]
    fn parse_accepts_padding_in_either_case() {
        let symbols = parse_sequence("AnN", 'N').unwrap();
        assert_eq!(
            symbols,
            vec![Symbol::Base(Base::A), Symbol::Padding, Symbol::Padding]
        );
    }

    #[test]
    fn parse_rejects_unknown_character() {
        let err = parse_sequence("ACGU", 'N').unwrap_err();
        assert_eq!(err, CodecError::InvalidSymbol { position: 3, found: 'U' });
    }

    #[test]
    fn symbol_renders_with_configured_padding() {
        assert_eq!(Symbol::Padding.to_char('-'), '-');
        assert_eq!(Symbol::Base(Base::G).to_char('-'), 'G');
    }
}
