use linkframe_frame::FrameConfig;
use linkframe_marshal::ByteOrder;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for a [`Link`](crate::Link).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```json
/// { "debug": false, "byte_order": "big-endian", "frame": { "polynomial": 155 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Log framing errors and unhandled packet ids from [`Link::tick`](crate::Link::tick).
    pub debug: bool,
    /// Byte order for multi-byte values unless a call overrides it.
    pub byte_order: ByteOrder,
    /// Checksum parameters; both ends must agree.
    pub frame: FrameConfig,
}

impl LinkConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            debug: true,
            byte_order: ByteOrder::default(),
            frame: FrameConfig::default(),
        }
    }
}
