//! Codec for the server payloads embedded in upstream markup.
//!
//! On the wire a payload is a JSON object `{"servers":[{"name":..,"id":..}]}`
//! that has been percent-encoded and then base64-encoded with the URL-safe
//! alphabet. Upstream markup sometimes keeps the padding as a literal `%3D`
//! and may wrap the blob across lines.

use base64::{
    Engine, alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::URL_SAFE_NO_PAD,
    },
};
use serde::{Deserialize, Deserializer, Serialize};

/// Standard alphabet decoder that tolerates missing padding and stray trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded bytes are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid percent-encoding: {0}")]
    PercentEncoding(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("malformed server entry: {0}")]
    MalformedEntry(String),
}

/// Raw server entry as found in the upstream payload.
///
/// `id` is either an opaque provider identifier or an already complete URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
}

impl ServerDescriptor {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Decoded payload; an absent `servers` key is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPayload {
    #[serde(default)]
    pub servers: Vec<ServerDescriptor>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub struct PayloadCodec;

impl PayloadCodec {
    /// Decode an embedded blob to its JSON text.
    ///
    /// Any failure is total: there is no partially decoded result.
    pub fn decode(encoded: &str) -> Result<String, DecodeError> {
        let mut normalized: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        normalized = normalized
            .replace("%3D", "=")
            .replace('-', "+")
            .replace('_', "/");
        while normalized.len() % 4 != 0 {
            normalized.push('=');
        }

        let bytes = LENIENT.decode(normalized.as_bytes())?;
        let text = String::from_utf8(bytes)?;

        urlencoding::decode(&text)
            .map(|decoded| decoded.into_owned())
            .map_err(|e| DecodeError::PercentEncoding(e.to_string()))
    }

    /// Parse decoded JSON text into a payload.
    pub fn parse_payload(text: &str) -> Result<DecodedPayload, DecodeError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(DecodeError::NotAnObject);
        }

        serde_json::from_value(value).map_err(|e| DecodeError::MalformedEntry(e.to_string()))
    }

    /// Decode and parse in one step.
    pub fn decode_payload(encoded: &str) -> Result<DecodedPayload, DecodeError> {
        Self::parse_payload(&Self::decode(encoded)?)
    }

    /// Encode a payload into the upstream wire format.
    pub fn encode(payload: &DecodedPayload) -> Result<String, DecodeError> {
        let json = serde_json::to_string(payload)?;
        Ok(URL_SAFE_NO_PAD.encode(urlencoding::encode(&json).as_bytes()))
    }
}
