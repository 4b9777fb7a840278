//! Decoder trait and format selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::binary::ByteFrameDecoder;
use crate::error::{DecodeAnomaly, FormatError};
use crate::line::LineRecordDecoder;
use crate::sample::Sample;

/// Result of decoding one window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    /// Samples in arrival order
    pub samples: Vec<Sample>,
    /// Leading bytes of the window the caller may drop
    pub consumed: usize,
    /// Input that was skipped
    pub anomalies: Vec<DecodeAnomaly>,
}

impl Decoded {
    /// Number of skipped bytes/records
    pub fn anomaly_count(&self) -> usize {
        self.anomalies
            .iter()
            .map(|a| match a {
                DecodeAnomaly::UnexpectedBytes { len, .. } => *len,
                _ => 1,
            })
            .sum()
    }
}

/// A stateless wire decoder
///
/// Implementations scan `window` from its start and report how many leading
/// bytes were fully handled. Bytes past `consumed` must be presented again,
/// extended with the next chunk, on the following call.
pub trait Decoder: Send + Sync + fmt::Debug {
    /// Decode as many complete records as the window holds
    fn decode(&self, window: &[u8]) -> Decoded;
}

/// Wire format of a tailed resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `<timestamp> <value>\n` text records (default)
    #[default]
    Line,
    /// `snp` + two big-endian f64 frames
    Binary,
}

impl Format {
    /// Build the decoder for this format
    pub fn decoder(self) -> Box<dyn Decoder> {
        match self {
            Self::Line => Box::new(LineRecordDecoder::new()),
            Self::Binary => Box::new(ByteFrameDecoder::new()),
        }
    }

    /// Format name as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" | "text" => Ok(Self::Line),
            "binary" | "bin" => Ok(Self::Binary),
            _ => Err(FormatError(s.to_string())),
        }
    }
}
