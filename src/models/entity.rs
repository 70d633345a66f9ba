// src/models/entity.rs
//! Registered cold-chain participants.
//!
//! An entity is an Ethereum-style account address bound to exactly one
//! role. Roles are a closed set and are validated where they enter the
//! system (string parsing, serde), so the registry itself only ever sees
//! well-formed [`Role`] values.

use crate::error::{ParseError, RegistryError};
use ethers_core::types::Address;
use ethers_core::utils::{hex, to_checksum};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 20-byte account address identifying a participant or caller.
///
/// # Text Form
/// Displayed and serialized as an EIP-55 checksummed `0x` string, which is
/// also the form embedded in canonical certificate messages. Parsing accepts
/// any letter case, with or without the `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Address);

impl Identity {
    /// Wraps a raw address.
    pub fn new(address: Address) -> Self {
        Identity(address)
    }

    /// Builds an identity from exactly 20 bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Identity(Address::from(bytes))
    }

    /// Underlying address.
    pub fn address(&self) -> Address {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        to_checksum(&self.0, None)
    }
}

impl From<Address> for Identity {
    fn from(address: Address) -> Self {
        Identity(address)
    }
}

impl FromStr for Identity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != 40 {
            return Err(ParseError::InvalidIdentity {
                input: s.to_string(),
                reason: format!("expected 40 hex digits, got {}", digits.len()),
            });
        }
        let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidIdentity {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Identity(Address::from_slice(&bytes)))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_checksum())
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// The exclusive role of a registered entity.
///
/// - `Issuer` certifies claims about provers (inspectors, immunizers).
/// - `Prover` is the subject of a certified claim (manufacturers, travellers).
/// - `Verifier` consumes certificates (distributors, border agents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Issuer,
    Prover,
    Verifier,
}

impl Role {
    /// Positional code of the role: `ISSUER=0`, `PROVER=1`, `VERIFIER=2`.
    pub fn code(self) -> u8 {
        match self {
            Role::Issuer => 0,
            Role::Prover => 1,
            Role::Verifier => 2,
        }
    }

    /// Inverse of [`Role::code`].
    pub fn from_code(code: u8) -> Result<Self, RegistryError> {
        match code {
            0 => Ok(Role::Issuer),
            1 => Ok(Role::Prover),
            2 => Ok(Role::Verifier),
            other => Err(RegistryError::InvalidMode(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Issuer => "ISSUER",
            Role::Prover => "PROVER",
            Role::Verifier => "VERIFIER",
        }
    }
}

impl FromStr for Role {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ISSUER" => Ok(Role::Issuer),
            "PROVER" => Ok(Role::Prover),
            "VERIFIER" => Ok(Role::Verifier),
            other => Err(RegistryError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered participant.
///
/// # Fields
/// - `id`: unique identity of the participant
/// - `mode`: its role, fixed at registration
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    pub id: Identity,
    pub mode: Role,
}

impl Entity {
    pub fn new(id: Identity, mode: Role) -> Self {
        Entity { id, mode }
    }

    /// Fails with `RoleMismatch` unless this entity holds `expected`.
    pub fn require_mode(&self, expected: Role) -> Result<(), RegistryError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(RegistryError::RoleMismatch {
                entity: self.id,
                expected,
                actual: self.mode,
            })
        }
    }
}
