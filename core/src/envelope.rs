//! Binary envelope carrying commands between peers and into replay logs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Command;

/// Identifier of the player that issued a command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Player slot reserved for the local host.
    pub const HOST: Self = Self(0);

    /// Creates a new player identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Flags that alter how the host processes an envelope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandFlags(u32);

impl CommandFlags {
    /// Validate and price the command without applying it.
    pub const QUERY_ONLY: u32 = 1 << 0;
    /// Apply the command without charging the ledger.
    pub const NO_SPEND: u32 = 1 << 1;

    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Wraps raw flag bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw flag bits.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Reports whether every bit of `flag` is set.
    #[must_use]
    pub const fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}

/// Generic wrapper placed around every command on the wire.
///
/// Field order is part of the wire format: player, flags, then the command
/// tag followed by the command's own fixed record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Player that issued the command.
    pub player: PlayerId,
    /// Processing flags.
    pub flags: CommandFlags,
    /// Command payload.
    pub command: Command,
}

/// Errors raised while encoding or decoding an envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The envelope could not be encoded.
    #[error("encode failed: {0}")]
    Encode(#[source] bincode::Error),
    /// The bytes do not describe an envelope.
    #[error("decode failed: {0}")]
    Decode(#[source] bincode::Error),
    /// The bytes describe an envelope followed by unexpected data.
    #[error("envelope followed by {count} trailing bytes")]
    TrailingBytes {
        /// Number of bytes left over after the envelope.
        count: usize,
    },
}

impl CommandEnvelope {
    /// Wraps a command issued by the provided player.
    #[must_use]
    pub const fn new(player: PlayerId, flags: CommandFlags, command: Command) -> Self {
        Self {
            player,
            flags,
            command,
        }
    }

    /// Encodes the envelope into its fixed-width little-endian binary form.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(CodecError::Encode)
    }

    /// Decodes an envelope, rejecting payloads with trailing data.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let envelope: Self = bincode::deserialize(bytes).map_err(CodecError::Decode)?;
        let consumed = bincode::serialized_size(&envelope).map_err(CodecError::Encode)?;
        let consumed = usize::try_from(consumed).unwrap_or(usize::MAX);
        if consumed < bytes.len() {
            return Err(CodecError::TrailingBytes {
                count: bytes.len() - consumed,
            });
        }
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::{CodecError, CommandEnvelope, CommandFlags, PlayerId};
    use crate::{CellCoord, Command, LandSetHeightParams, SlopeStyle};

    fn sample() -> CommandEnvelope {
        CommandEnvelope::new(
            PlayerId::new(3),
            CommandFlags::from_bits(CommandFlags::NO_SPEND),
            Command::SetLandHeight(LandSetHeightParams::new(
                CellCoord::new(10, 258),
                16,
                SlopeStyle::from_bits(SlopeStyle::NORTH_UP | SlopeStyle::EAST_UP),
            )),
        )
    }

    #[test]
    fn envelope_layout_is_fixed_and_ordered() {
        let bytes = sample().encode().expect("encode");
        assert_eq!(
            bytes,
            vec![
                3, // player
                2, 0, 0, 0, // flags
                0, 0, 0, 0, // command tag
                10, 0, 0, 0, // column
                2, 1, 0, 0, // row
                16, // height
                3, // style
            ]
        );
    }

    #[test]
    fn envelope_decodes_to_equal_command() {
        let envelope = sample();
        let bytes = envelope.encode().expect("encode");
        let decoded = CommandEnvelope::decode(&bytes).expect("decode");
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = sample().encode().expect("encode");
        bytes.push(0xaa);
        assert!(matches!(
            CommandEnvelope::decode(&bytes),
            Err(CodecError::TrailingBytes { count: 1 })
        ));
    }

    #[test]
    fn decode_rejects_truncated_record() {
        let bytes = sample().encode().expect("encode");
        assert!(matches!(
            CommandEnvelope::decode(&bytes[..bytes.len() - 1]),
            Err(CodecError::Decode(_))
        ));
    }
}
