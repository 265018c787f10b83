//! Party roles in a two-party computation.

use std::{
    fmt,
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

/// Party role decode error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid party role: {0}")]
pub struct InvalidPartyRole(String);

/// The role a party plays in a two-party computation.
///
/// Protocols that apply a public value to a secret-shared one must apply it exactly once. By convention
/// that is always done by [`PartyRole::PRIMARY`], and every such branch should check
/// [`PartyRole::is_primary`] rather than compare raw indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum PartyRole {
    /// Role 0.
    Primary,

    /// Role 1.
    Secondary,
}

impl PartyRole {
    /// The party that owns public deltas and public cross terms.
    pub const PRIMARY: PartyRole = PartyRole::Primary;

    /// Both roles, in index order.
    pub const ALL: [PartyRole; 2] = [PartyRole::Primary, PartyRole::Secondary];

    /// The numeric index of this role.
    pub fn index(&self) -> usize {
        match self {
            PartyRole::Primary => 0,
            PartyRole::Secondary => 1,
        }
    }

    /// The role of the other party.
    pub fn peer(&self) -> PartyRole {
        match self {
            PartyRole::Primary => PartyRole::Secondary,
            PartyRole::Secondary => PartyRole::Primary,
        }
    }

    /// Whether this is the primary party.
    pub fn is_primary(&self) -> bool {
        *self == Self::PRIMARY
    }
}

impl TryFrom<usize> for PartyRole {
    type Error = InvalidPartyRole;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(PartyRole::Primary),
            1 => Ok(PartyRole::Secondary),
            other => Err(InvalidPartyRole(other.to_string())),
        }
    }
}

impl FromStr for PartyRole {
    type Err = InvalidPartyRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "primary" => Ok(PartyRole::Primary),
            "1" | "secondary" => Ok(PartyRole::Secondary),
            _ => Err(InvalidPartyRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for PartyRole {
    type Error = InvalidPartyRole;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PartyRole> for String {
    fn from(role: PartyRole) -> Self {
        role.to_string()
    }
}

impl Display for PartyRole {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PartyRole::Primary => write!(f, "primary"),
            PartyRole::Secondary => write!(f, "secondary"),
        }
    }
}
