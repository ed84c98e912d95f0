use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

/// Byte offsets of the hyphens in `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];
const CANONICAL_LEN: usize = 36;

/// A 128-bit identifier whose canonical string form is uppercase hex grouped
/// 8-4-4-4-12. Ordering matches the ordering of the canonical strings.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Guid(Uuid);

impl Guid {
    pub fn new() -> Self {
        Self::from_random(&mut rand::thread_rng())
    }

    /// Build a version 4 identifier from any random source. Seeded sources
    /// give reproducible identifiers.
    pub fn from_random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Parse the grouped-hex form, accepting either letter case.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let well_formed = s.len() == CANONICAL_LEN
            && s.char_indices().all(|(i, c)| {
                if HYPHEN_POSITIONS.contains(&i) {
                    c == '-'
                } else {
                    c.is_ascii_hexdigit()
                }
            });
        if !well_formed {
            return Err(CoreError::InvalidFormat(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| CoreError::InvalidFormat(s.to_string()))
    }

    /// Canonical (uppercase, hyphenated) string.
    pub fn to_canonical(&self) -> String {
        let mut buf = Uuid::encode_buffer();
        self.0.hyphenated().encode_upper(&mut buf).to_string()
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Guid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Uuid::encode_buffer();
        f.write_str(self.0.hyphenated().encode_upper(&mut buf))
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Guid::parse(&s).map_err(serde::de::Error::custom)
    }
}

macro_rules! guid_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Guid);

        impl $name {
            pub fn new() -> Self {
                Self(Guid::new())
            }

            pub fn from_guid(guid: Guid) -> Self {
                Self(guid)
            }

            pub fn as_guid(&self) -> &Guid {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.0.to_canonical()[..8])
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Guid::parse(s).map(Self)
            }
        }

        impl From<Guid> for $name {
            fn from(guid: Guid) -> Self {
                Self(guid)
            }
        }
    };
}

guid_id!(ClubId);
guid_id!(PersonId);
guid_id!(FineId);
guid_id!(ReasonTemplateId);
