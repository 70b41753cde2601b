//! Component schema for on-chain game entities
//!
//! Every entity is a bag of component values keyed by kind. The kinds are
//! fixed at compile time and mirror the models the game contract exposes:
//! - Position - grid coordinates of a player's pawn
//! - PlayerAddress - the account that owns a pawn
//! - PlayerId - sequential player index, resolved from an address
//! - Energy - action budget
//! - Hand - the pawn's current hand sign

use crate::Address;

/// Component kind - one per on-chain model the client tracks
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Position,
    PlayerAddress,
    PlayerId,
    Energy,
    Hand,
}

impl ComponentKind {
    /// Every tracked kind, in subscription order
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Position,
        ComponentKind::PlayerAddress,
        ComponentKind::PlayerId,
        ComponentKind::Energy,
        ComponentKind::Hand,
    ];

    /// On-chain model name for this kind
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Position => "Position",
            ComponentKind::PlayerAddress => "PlayerAddress",
            ComponentKind::PlayerId => "PlayerId",
            ComponentKind::Energy => "Energy",
            ComponentKind::Hand => "Hand",
        }
    }
}

/// Grid position of a pawn
///
/// Coordinates are unsigned; the contract keeps the playfield away from
/// zero with an origin offset, so zero is the hard edge of the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Position { x, y }
    }
}

/// Hand sign a pawn currently shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandKind {
    Rock,
    Paper,
    Scissors,
}

impl HandKind {
    /// Wire encoding used by the contract enum
    pub fn to_felt(self) -> u64 {
        match self {
            HandKind::Rock => 1,
            HandKind::Paper => 2,
            HandKind::Scissors => 3,
        }
    }

    pub fn from_felt(felt: u64) -> Option<Self> {
        match felt {
            1 => Some(HandKind::Rock),
            2 => Some(HandKind::Paper),
            3 => Some(HandKind::Scissors),
            _ => None,
        }
    }
}

/// One component value - a typed record bound to a (entity, kind) pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentValue {
    Position(Position),
    PlayerAddress { player: Address },
    PlayerId { id: u32 },
    Energy { amount: u32 },
    Hand(HandKind),
}

impl ComponentValue {
    /// The kind this value belongs to
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentValue::Position(_) => ComponentKind::Position,
            ComponentValue::PlayerAddress { .. } => ComponentKind::PlayerAddress,
            ComponentValue::PlayerId { .. } => ComponentKind::PlayerId,
            ComponentValue::Energy { .. } => ComponentKind::Energy,
            ComponentValue::Hand(_) => ComponentKind::Hand,
        }
    }

    /// Position payload, if this is a Position value
    pub fn as_position(&self) -> Option<Position> {
        match self {
            ComponentValue::Position(pos) => Some(*pos),
            _ => None,
        }
    }

    /// Player index payload, if this is a PlayerId value
    pub fn as_player_id(&self) -> Option<u32> {
        match self {
            ComponentValue::PlayerId { id } => Some(*id),
            _ => None,
        }
    }

    /// Owning address payload, if this is a PlayerAddress value
    pub fn as_player_address(&self) -> Option<Address> {
        match self {
            ComponentValue::PlayerAddress { player } => Some(*player),
            _ => None,
        }
    }
}
