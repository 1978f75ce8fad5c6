//! JSON encoding and codec selection
//!
//! Same messages, serde-derived adjacently tagged objects
//! (`{"tag": "InsertAt", "value": {...}}`). Slower than the binary codec
//! but readable in logs and usable from hosts without a binary decoder.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{WireDecode, WireEncode, WireError};

/// Serialize any wire message to JSON bytes
pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize a wire message from JSON bytes
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Codec used on a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Binary,
    Json,
}

impl Encoding {
    pub fn encode_message<T>(self, message: &T) -> Result<Vec<u8>, WireError>
    where
        T: WireEncode + Serialize,
    {
        match self {
            Encoding::Binary => Ok(message.to_bytes()),
            Encoding::Json => to_json(message),
        }
    }

    pub fn decode_message<T>(self, bytes: &[u8]) -> Result<T, WireError>
    where
        T: WireDecode + DeserializeOwned,
    {
        match self {
            Encoding::Binary => T::from_bytes(bytes),
            Encoding::Json => from_json(bytes),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Binary => "binary",
            Encoding::Json => "json",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized encoding name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown encoding: {0}")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(Encoding::Binary),
            "json" => Ok(Encoding::Json),
            other => Err(UnknownEncoding(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ApiMsg, ApiResponse, Color, ElementChild, SceneChange, StyleProp, SurfaceId, WindowEvent,
        WindowId,
    };

    #[test]
    fn test_json_shape_is_adjacently_tagged() {
        let change = SceneChange::InsertAt {
            parent: SurfaceId(0),
            child: ElementChild::Element(SurfaceId(4)),
            index: 1,
        };
        let value: serde_json::Value = serde_json::from_slice(&to_json(&change).unwrap()).unwrap();

        assert_eq!(value["tag"], "InsertAt");
        assert_eq!(value["value"]["parent"], 0);
        assert_eq!(value["value"]["child"]["tag"], "Element");
        assert_eq!(value["value"]["child"]["value"], 4);
    }

    #[test]
    fn test_json_decodes_native_events() {
        let raw = br#"{"tag":"Events","value":{"events":[
            {"tag":"MouseDown","value":{"target":3}},
            {"tag":"KeyDown","value":36},
            {"tag":"Close"}
        ]}}"#;
        let response: ApiResponse = Encoding::Json.decode_message(raw).unwrap();

        assert_eq!(
            response,
            ApiResponse::Events {
                events: vec![
                    WindowEvent::MouseDown { target: SurfaceId(3) },
                    WindowEvent::KeyDown(36),
                    WindowEvent::Close,
                ]
            }
        );
    }

    #[test]
    fn test_unknown_json_tag_rejected() {
        let raw = br#"{"tag":"Explode","value":{}}"#;
        let result: Result<SceneChange, _> = Encoding::Json.decode_message(raw);
        assert!(matches!(result, Err(WireError::Json(_))));
    }

    #[test]
    fn test_both_encodings_carry_the_same_message() {
        let msg = ApiMsg::UpdateScene {
            window: WindowId(1),
            changes: vec![SceneChange::SetStyleProp {
                surface: SurfaceId(2),
                prop: StyleProp::BackgroundColor(Some(Color::new(1, 2, 3, 4))),
            }],
        };

        for encoding in [Encoding::Binary, Encoding::Json] {
            let bytes = encoding.encode_message(&msg).unwrap();
            let back: ApiMsg = encoding.decode_message(&bytes).unwrap();
            assert_eq!(back, msg, "{}", encoding);
        }
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("JSON".parse::<Encoding>(), Ok(Encoding::Json));
        assert_eq!(" binary ".parse::<Encoding>(), Ok(Encoding::Binary));
        assert!("xml".parse::<Encoding>().is_err());
    }
}
