// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port color palette.

use serde::{Deserialize, Serialize};

/// Named color a port type can be drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortColor {
    /// Yellow
    Yellow,
    /// Orange
    Orange,
    /// Red
    Red,
    /// Pink
    Pink,
    /// Purple
    Purple,
    /// Blue
    Blue,
    /// Green
    Green,
    /// Grey
    Grey,
}

impl PortColor {
    /// Every palette entry, in display order
    pub const ALL: [PortColor; 8] = [
        Self::Yellow,
        Self::Orange,
        Self::Red,
        Self::Pink,
        Self::Purple,
        Self::Blue,
        Self::Green,
        Self::Grey,
    ];

    /// Resolve a color token from a schema. Empty or unknown tokens resolve to `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|color| color.token().eq_ignore_ascii_case(token))
            // "gray" shows up in hand-written schemas
            .or_else(|| token.eq_ignore_ascii_case("gray").then_some(Self::Grey))
    }

    /// The schema token for this color
    pub fn token(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Grey => "grey",
        }
    }

    /// Concrete RGB value used when rendering
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            Self::Yellow => [212, 182, 39],
            Self::Orange => [222, 132, 47],
            Self::Red => [218, 68, 68],
            Self::Pink => [219, 98, 169],
            Self::Purple => [145, 87, 214],
            Self::Blue => [67, 132, 219],
            Self::Green => [75, 185, 97],
            Self::Grey => [150, 150, 150],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_resolution() {
        assert_eq!(PortColor::from_token("green"), Some(PortColor::Green));
        assert_eq!(PortColor::from_token(" Blue "), Some(PortColor::Blue));
        assert_eq!(PortColor::from_token("gray"), Some(PortColor::Grey));
        assert_eq!(PortColor::from_token(""), None);
        assert_eq!(PortColor::from_token("chartreuse"), None);
    }

    #[test]
    fn test_tokens_round_trip_through_serde() {
        for color in PortColor::ALL {
            let json = serde_json::to_string(&color).unwrap();
            assert_eq!(json, format!("\"{}\"", color.token()));
        }
    }
}
