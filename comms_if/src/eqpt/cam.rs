//! # Camera Equipment Communications Module
//!
//! Frames are published by the camera source as JSON `CamFrame`s carrying the raw BGRA pixels
//! base64 encoded. Consumers convert them into a `Frame` before processing.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of bytes used by each pixel of a frame (B, G, R, A).
pub const BYTES_PER_PIXEL: usize = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A frame as it is sent over the network.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CamFrame {
    /// UTC timestamp at which the frame was acquired
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Width of the frame in pixels
    pub width: u32,

    /// Height of the frame in pixels
    pub height: u32,

    /// Base64 encoded BGRA pixel data, row major
    pub b64_data: String
}

/// A decoded frame, an immutable BGRA raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    width: u32,
    height: u32,
    data: Vec<u8>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while building a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Could not decode the frame data: {0}")]
    DecodeError(base64::DecodeError),

    #[error("Expected {expected} bytes for a {width}x{height} BGRA frame, found {found}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        found: usize
    },

    #[error("Frame dimensions must be non-zero and even, found {0}x{1}")]
    InvalidDimensions(u32, u32)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Frame {
    /// Build a frame from raw BGRA bytes.
    pub fn from_bgra(
        timestamp: DateTime<Utc>,
        width: u32,
        height: u32,
        data: Vec<u8>
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(FrameError::InvalidDimensions(width, height))
        }

        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(FrameError::SizeMismatch {
                width,
                height,
                expected,
                found: data.len()
            })
        }

        Ok(Self {
            timestamp,
            width,
            height,
            data
        })
    }

    /// Build a frame filled with a single BGRA colour.
    pub fn filled(
        timestamp: DateTime<Utc>,
        width: u32,
        height: u32,
        bgra: [u8; 4]
    ) -> Result<Self, FrameError> {
        let num_px = width as usize * height as usize;
        let data = bgra.iter().copied().cycle().take(num_px * BYTES_PER_PIXEL).collect();

        Self::from_bgra(timestamp, width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw BGRA bytes of the frame.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the BGRA value of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None
        }

        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Set the BGRA value of every pixel in the given rectangle, clipped to the frame.
    ///
    /// Used to build frames for tests and benchmarks.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, bgra: [u8; 4]) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);

        for row in y.min(self.height)..y_end {
            for col in x.min(self.width)..x_end {
                let i = (row as usize * self.width as usize + col as usize) * BYTES_PER_PIXEL;
                self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&bgra);
            }
        }
    }

    /// Encode this frame for transmission.
    pub fn to_cam_frame(&self) -> CamFrame {
        CamFrame {
            timestamp: self.timestamp,
            width: self.width,
            height: self.height,
            b64_data: base64::encode(&self.data)
        }
    }
}

impl TryFrom<&CamFrame> for Frame {
    type Error = FrameError;

    fn try_from(cam_frame: &CamFrame) -> Result<Self, Self::Error> {
        let data = base64::decode(&cam_frame.b64_data)
            .map_err(FrameError::DecodeError)?;

        Frame::from_bgra(cam_frame.timestamp, cam_frame.width, cam_frame.height, data)
    }
}
