use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use landscape_core::{CodecError, CommandEnvelope};

const TRANSFER_DOMAIN: &str = "landcmd";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded envelope.
pub(crate) const TRANSFER_HEADER: &str = "landcmd:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes an envelope into a single-line string that can be pasted between processes.
pub(crate) fn encode(envelope: &CommandEnvelope) -> Result<String, CodecError> {
    let bytes = envelope.encode()?;
    let encoded = STANDARD_NO_PAD.encode(bytes);
    Ok(format!("{TRANSFER_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes an envelope from its transfer string.
pub(crate) fn decode(value: &str) -> Result<CommandEnvelope, CommandTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommandTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(CommandTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(CommandTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(CommandTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(CommandTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(CommandTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(CommandTransferError::InvalidEncoding)?;
    CommandEnvelope::decode(&bytes).map_err(CommandTransferError::InvalidPayload)
}

/// Errors that can occur while decoding command transfer strings.
#[derive(Debug)]
pub(crate) enum CommandTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The string did not contain a version segment.
    MissingVersion,
    /// The string did not include the payload segment.
    MissingPayload,
    /// The string used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The string used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded bytes are not a command envelope.
    InvalidPayload(CodecError),
}

impl fmt::Display for CommandTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "command string was empty"),
            Self::MissingPrefix => write!(f, "command string is missing the prefix"),
            Self::MissingVersion => write!(f, "command string is missing the version"),
            Self::MissingPayload => write!(f, "command string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "command prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "command version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode command payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse command payload: {error}")
            }
        }
    }
}

impl Error for CommandTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landscape_core::{
        CellCoord, Command, CommandFlags, LandSetHeightParams, PlayerId, SlopeStyle,
    };

    fn sample() -> CommandEnvelope {
        CommandEnvelope::new(
            PlayerId::new(1),
            CommandFlags::from_bits(CommandFlags::QUERY_ONLY),
            Command::SetLandHeight(LandSetHeightParams::new(
                CellCoord::new(12, 7),
                20,
                SlopeStyle::from_bits(SlopeStyle::EAST_UP | SlopeStyle::SOUTH_UP),
            )),
        )
    }

    #[test]
    fn round_trip_through_transfer_string() {
        let envelope = sample();

        let encoded = encode(&envelope).expect("envelope encodes");
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:")));
        assert!(!encoded.ends_with('='), "padding is omitted");

        let decoded = decode(&format!("  {encoded}\n")).expect("command decodes");
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn foreign_and_future_strings_are_refused() {
        let encoded = encode(&sample()).expect("envelope encodes");
        let payload = encoded
            .rsplit(FIELD_DELIMITER)
            .next()
            .expect("payload segment");

        assert!(matches!(
            decode(&format!("maze:v1:{payload}")),
            Err(CommandTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode(&format!("landcmd:v2:{payload}")),
            Err(CommandTransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            decode("landcmd:v1"),
            Err(CommandTransferError::MissingPayload)
        ));
        assert!(matches!(decode("   "), Err(CommandTransferError::EmptyPayload)));
    }

    #[test]
    fn truncated_payload_is_reported() {
        let truncated = format!("{TRANSFER_HEADER}:{}", STANDARD_NO_PAD.encode([1u8, 0, 0]));
        assert!(matches!(
            decode(&truncated),
            Err(CommandTransferError::InvalidPayload(_))
        ));
        assert!(matches!(
            decode("landcmd:v1:@@@"),
            Err(CommandTransferError::InvalidEncoding(_))
        ));
    }
}
