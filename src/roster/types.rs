//! Raw entity records supplied by the data-access layer.

use crate::error::InputError;
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifier of a dancer.
    DancerId
);
entity_id!(
    /// Identifier of a dance.
    DanceId
);
entity_id!(
    /// Identifier of a position, unique only within its dance.
    PositionId
);

/// How willing a dancer is to take a given position.
///
/// Variants are ordered: `Forbidden < Maybe < Yes < Favourite`.
/// Stored as small integers (`0..=3`) and written as
/// `no`, `maybe`, `yes`, `favourite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "i64"))]
pub enum Preference {
    /// The dancer can never take this position.
    #[default]
    Forbidden,
    Maybe,
    Yes,
    Favourite,
}

impl Preference {
    /// All tiers, lowest first.
    pub const ALL: [Preference; 4] = [
        Preference::Forbidden,
        Preference::Maybe,
        Preference::Yes,
        Preference::Favourite,
    ];

    /// Tiers a dancer may be assigned under, most preferred first.
    pub const ASSIGNABLE: [Preference; 3] =
        [Preference::Favourite, Preference::Yes, Preference::Maybe];

    /// Integer code used by the storage layer.
    pub fn code(self) -> i64 {
        match self {
            Preference::Forbidden => 0,
            Preference::Maybe => 1,
            Preference::Yes => 2,
            Preference::Favourite => 3,
        }
    }

    /// Decodes a storage code. Unknown codes are rejected.
    pub fn from_code(code: i64) -> Result<Self, InputError> {
        match code {
            0 => Ok(Preference::Forbidden),
            1 => Ok(Preference::Maybe),
            2 => Ok(Preference::Yes),
            3 => Ok(Preference::Favourite),
            other => Err(InputError::InvalidPreferenceCode(other)),
        }
    }

    /// Whether a dancer may ever be placed under this tier.
    pub fn is_assignable(self) -> bool {
        self != Preference::Forbidden
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preference::Forbidden => "no",
            Preference::Maybe => "maybe",
            Preference::Yes => "yes",
            Preference::Favourite => "favourite",
        }
    }
}

impl TryFrom<i64> for Preference {
    type Error = InputError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Preference::from_code(code)
    }
}

impl From<Preference> for i64 {
    fn from(preference: Preference) -> Self {
        preference.code()
    }
}

impl FromStr for Preference {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no" => Ok(Preference::Forbidden),
            "maybe" => Ok(Preference::Maybe),
            "yes" => Ok(Preference::Yes),
            "favourite" | "favorite" => Ok(Preference::Favourite),
            _ => Err(InputError::InvalidPreference(s.to_string())),
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a member of the group does: dance, play music, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "i64"))]
pub enum Role {
    #[default]
    Dancer,
    Musician,
    Both,
}

impl Role {
    pub fn code(self) -> i64 {
        match self {
            Role::Dancer => 1,
            Role::Musician => 2,
            Role::Both => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, InputError> {
        match code {
            1 => Ok(Role::Dancer),
            2 => Ok(Role::Musician),
            3 => Ok(Role::Both),
            other => Err(InputError::InvalidRoleCode(other)),
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = InputError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Role::from_code(code)
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

/// A person who may be assigned to positions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dancer {
    pub id: DancerId,
    pub name: String,
    /// Inactive dancers are never assigned.
    pub active: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Role,
}

impl Dancer {
    /// Creates an active dancer with the default role.
    pub fn new(id: impl Into<DancerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: true,
            role: Role::default(),
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// A role within a dance that needs exactly one dancer when performed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub id: PositionId,
    pub name: String,
}

impl Position {
    pub fn new(id: impl Into<PositionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A dance and its positions, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dance {
    pub id: DanceId,
    pub name: String,
    pub positions: Vec<Position>,
}

impl Dance {
    pub fn new(id: impl Into<DanceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            positions: Vec::new(),
        }
    }

    /// Appends a position.
    pub fn with_position(mut self, id: impl Into<PositionId>, name: impl Into<String>) -> Self {
        self.positions.push(Position::new(id, name));
        self
    }

    /// Looks up a position by id.
    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }
}

/// One dancer's stated preference for one position of one dance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreferenceEdge {
    pub dancer: DancerId,
    pub dance: DanceId,
    pub position: PositionId,
    pub preference: Preference,
}

impl PreferenceEdge {
    pub fn new(
        dancer: impl Into<DancerId>,
        dance: impl Into<DanceId>,
        position: impl Into<PositionId>,
        preference: Preference,
    ) -> Self {
        Self {
            dancer: dancer.into(),
            dance: dance.into(),
            position: position.into(),
            preference,
        }
    }
}
