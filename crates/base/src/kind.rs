use std::str::FromStr;

use snafu::Snafu;

/// The two clipboard slots tracked by the desktop environment: copy/paste and
/// middle-click paste.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
    #[default]
    Clipboard,

    Primary,
}

impl Kind {
    pub const MAX_LENGTH: usize = 2;
}

impl From<usize> for Kind {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::Clipboard,
            _ => Self::Primary,
        }
    }
}

impl From<Kind> for usize {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Clipboard => 0,
            Kind::Primary => 1,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Clipboard => "Clipboard",
            Self::Primary => "Primary",
        })
    }
}

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clipboard" => Ok(Self::Clipboard),
            "primary" => Ok(Self::Primary),
            _ => Err(ParseKindError { value: s.to_string() }),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Snafu)]
#[snafu(display("`{value}` is not a valid clipboard kind"))]
pub struct ParseKindError {
    value: String,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Kind;

    #[test]
    fn index_round_trip() {
        for i in 0..Kind::MAX_LENGTH {
            assert_eq!(usize::from(Kind::from(i)), i);
        }
    }

    #[test]
    fn parse() {
        assert_eq!(Kind::from_str("clipboard"), Ok(Kind::Clipboard));
        assert_eq!(Kind::from_str("Primary"), Ok(Kind::Primary));
        assert!(Kind::from_str("secondary").is_err());
    }
}
