//! Item type tags
//!
//! The numbering follows the level format's model ids, so a raw tag read
//! from level data converts directly with [`ItemType::from_raw`].

use std::fmt;

use crate::error::ItemError;

macro_rules! item_types {
    ($($name:ident = $id:literal,)*) => {
        /// Type tag of an item
        #[repr(u16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum ItemType {
            $($name = $id,)*
        }

        impl ItemType {
            /// Every type tag in id order
            pub const ALL: &'static [ItemType] = &[$(ItemType::$name,)*];

            /// Create from a raw model id
            pub fn from_raw(raw: u16) -> Option<Self> {
                match raw {
                    $($id => Some(ItemType::$name),)*
                    _ => None,
                }
            }

            /// Variant name
            pub fn name(self) -> &'static str {
                match self {
                    $(ItemType::$name => stringify!($name),)*
                }
            }
        }
    };
}

item_types! {
    Lara = 0,
    LaraPistols = 1,
    LaraShotgun = 2,
    LaraMagnums = 3,
    LaraUzis = 4,
    LaraSpec = 5,
    Doppelganger = 6,
    Wolf = 7,
    Bear = 8,
    Bat = 9,
    CrocodileLand = 10,
    CrocodileWater = 11,
    LionMale = 12,
    LionFemale = 13,
    Puma = 14,
    Gorilla = 15,
    RatLand = 16,
    RatWater = 17,
    Rex = 18,
    Raptor = 19,
    Mutant1 = 20,
    Mutant2 = 21,
    Mutant3 = 22,
    Centaur = 23,
    Mummy = 24,
    Unused1 = 25,
    Unused2 = 26,
    Larson = 27,
    Pierre = 28,
    Skateboard = 29,
    Skater = 30,
    Cowboy = 31,
    MrT = 32,
    Natla = 33,
    Adam = 34,
    TrapFloor = 35,
    TrapSwingBlade = 36,
    TrapSpikes = 37,
    TrapBoulder = 38,
    Dart = 39,
    TrapDartEmitter = 40,
    Drawbridge = 41,
    TrapSlam = 42,
    TrapSword = 43,
    HammerHandle = 44,
    HammerBlock = 45,
    Lightning = 46,
    MovingObject = 47,
    Block1 = 48,
    Block2 = 49,
    Block3 = 50,
    Block4 = 51,
    MovingBlock = 52,
    TrapCeiling1 = 53,
    TrapCeiling2 = 54,
    Switch = 55,
    SwitchWater = 56,
    Door1 = 57,
    Door2 = 58,
    Door3 = 59,
    Door4 = 60,
    Door5 = 61,
    Door6 = 62,
    Door7 = 63,
    Door8 = 64,
    TrapDoor1 = 65,
    TrapDoor2 = 66,
    Unused3 = 67,
    BridgeFlat = 68,
    BridgeTilt1 = 69,
    BridgeTilt2 = 70,
    InvPassport = 71,
    InvCompass = 72,
    InvHome = 73,
    Gears1 = 74,
    Gears2 = 75,
    Gears3 = 76,
    Cut1 = 77,
    Cut2 = 78,
    Cut3 = 79,
    Cut4 = 80,
    InvPassportClosed = 81,
    InvMap = 82,
    Crystal = 83,
    Pistols = 84,
    Shotgun = 85,
    Magnums = 86,
    Uzis = 87,
    AmmoPistols = 88,
    AmmoShotgun = 89,
    AmmoMagnums = 90,
    AmmoUzis = 91,
    Explosive = 92,
    MedikitSmall = 93,
    MedikitBig = 94,
    InvDetail = 95,
    InvSound = 96,
    InvControls = 97,
    InvGamma = 98,
    InvPistols = 99,
    InvShotgun = 100,
    InvMagnums = 101,
    InvUzis = 102,
    InvAmmoPistols = 103,
    InvAmmoShotgun = 104,
    InvAmmoMagnums = 105,
    InvAmmoUzis = 106,
    InvExplosive = 107,
    InvMedikitSmall = 108,
    InvMedikitBig = 109,
    Puzzle1 = 110,
    Puzzle2 = 111,
    Puzzle3 = 112,
    Puzzle4 = 113,
    InvPuzzle1 = 114,
    InvPuzzle2 = 115,
    InvPuzzle3 = 116,
    InvPuzzle4 = 117,
    PuzzleHole1 = 118,
    PuzzleHole2 = 119,
    PuzzleHole3 = 120,
    PuzzleHole4 = 121,
    PuzzleDone1 = 122,
    PuzzleDone2 = 123,
    PuzzleDone3 = 124,
    PuzzleDone4 = 125,
    Leadbar = 126,
    InvLeadbar = 127,
    MidasHand = 128,
    KeyItem1 = 129,
    KeyItem2 = 130,
    KeyItem3 = 131,
    KeyItem4 = 132,
    InvKeyItem1 = 133,
    InvKeyItem2 = 134,
    InvKeyItem3 = 135,
    InvKeyItem4 = 136,
    Keyhole1 = 137,
    Keyhole2 = 138,
    Keyhole3 = 139,
    Keyhole4 = 140,
    Unused4 = 141,
    Unused5 = 142,
    ScionPickupQualopec = 143,
    ScionPickupDrop = 144,
    ScionTarget = 145,
    ScionPickupHolder = 146,
    ScionHolder = 147,
    Unused6 = 148,
    Unused7 = 149,
    InvScion = 150,
    Explosion = 151,
    Unused8 = 152,
    Splash = 153,
    Unused9 = 154,
    Bubble = 155,
    Unused10 = 156,
    Unused11 = 157,
    Blood = 158,
    Unused12 = 159,
    Smoke = 160,
    CentaurStatue = 161,
    Cabin = 162,
    MutantEggSmall = 163,
    Ricochet = 164,
    Sparkles = 165,
    MuzzleFlash = 166,
    Unused13 = 167,
    Unused14 = 168,
    ViewTarget = 169,
    Waterfall = 170,
    NatlaBullet = 171,
    MutantBullet = 172,
    CentaurBullet = 173,
    Unused15 = 174,
    Unused16 = 175,
    LavaParticle = 176,
    LavaEmitter = 177,
    Flame = 178,
    FlameEmitter = 179,
    TrapLava = 180,
    MutantEggBig = 181,
    Boat = 182,
    Earthquake = 183,
    Unused17 = 184,
    Unused18 = 185,
    Unused19 = 186,
    Unused20 = 187,
    Unused21 = 188,
    LaraBraid = 189,
    Glyphs = 190,
}

impl ItemType {
    /// Raw model id
    pub fn raw(self) -> u16 {
        self as u16
    }

    /// The controllable actor
    pub fn is_lara(self) -> bool {
        self == Self::Lara
    }

    /// Creatures driven by the enemy controller
    pub fn is_enemy(self) -> bool {
        use ItemType::*;
        matches!(
            self,
            Doppelganger
                | Wolf
                | Bear
                | Bat
                | CrocodileLand
                | CrocodileWater
                | LionMale
                | LionFemale
                | Puma
                | Gorilla
                | RatLand
                | RatWater
                | Rex
                | Raptor
                | Mutant1
                | Mutant2
                | Mutant3
                | Centaur
                | Mummy
                | Larson
                | Pierre
                | Skater
                | Cowboy
                | MrT
                | Natla
                | Adam
        )
    }

    /// Pushable blocks and other solid animated objects
    pub fn is_block(self) -> bool {
        matches!(self, Self::Block1 | Self::Block2 | Self::Block3 | Self::Block4)
    }

    pub fn is_door(self) -> bool {
        (Self::Door1.raw()..=Self::Door8.raw()).contains(&self.raw())
    }

    pub fn is_trap_door(self) -> bool {
        matches!(self, Self::TrapDoor1 | Self::TrapDoor2)
    }

    pub fn is_bridge(self) -> bool {
        matches!(self, Self::BridgeFlat | Self::BridgeTilt1 | Self::BridgeTilt2)
    }

    /// Items whose surface merges into the room floor
    pub fn provides_floor(self) -> bool {
        self.is_bridge() || self.is_trap_door() || matches!(self, Self::Drawbridge | Self::TrapFloor)
    }

    /// Short-lived sprite effects
    pub fn is_sprite_effect(self) -> bool {
        matches!(
            self,
            Self::Splash | Self::Blood | Self::Smoke | Self::Ricochet | Self::Sparkles
        )
    }

    /// Objects driven by the generic object controller
    pub fn is_object(self) -> bool {
        use ItemType::*;
        self.is_block()
            || self.is_door()
            || self.is_trap_door()
            || matches!(
                self,
                TrapFloor
                    | TrapSwingBlade
                    | Dart
                    | TrapDartEmitter
                    | Drawbridge
                    | Switch
                    | SwitchWater
                    | Crystal
                    | PuzzleHole1
                    | PuzzleHole2
                    | PuzzleHole3
                    | PuzzleHole4
                    | Keyhole1
                    | Keyhole2
                    | Keyhole3
                    | Keyhole4
                    | Waterfall
                    | LavaEmitter
            )
    }
}

impl TryFrom<u16> for ItemType {
    type Error = ItemError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or(ItemError::UnknownItemType(raw))
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.raw())
    }
}
