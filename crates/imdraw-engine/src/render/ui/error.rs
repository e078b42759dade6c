use std::fmt;

/// Failure while building the one-time UI resources.
///
/// Fatal: the renderer cannot be constructed and there is no partial state to recover.
#[derive(Debug, Clone, PartialEq)]
pub enum InitError {
    /// A configuration value is unusable (for example a uniform ring depth of zero).
    InvalidConfig(String),
    /// The font atlas has a zero extent or its pixel data does not match its dimensions.
    InvalidFontAtlas {
        width: u32,
        height: u32,
        len: usize,
    },
    /// The font atlas exceeds the device's 2D texture limit.
    FontAtlasTooLarge { width: u32, height: u32, max: u32 },
    /// A one-time buffer (uniform ring, font staging) would exceed `max_buffer_size`.
    BufferTooLarge {
        what: &'static str,
        size: u64,
        max: u64,
    },
    /// The device rejected resource creation (validation or out of memory).
    Device(String),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::InvalidConfig(msg) => write!(f, "invalid ui renderer config: {msg}"),
            InitError::InvalidFontAtlas { width, height, len } => write!(
                f,
                "invalid font atlas: {width}x{height} RGBA32 with {len} bytes of pixel data"
            ),
            InitError::FontAtlasTooLarge { width, height, max } => write!(
                f,
                "font atlas {width}x{height} exceeds the device texture limit of {max}"
            ),
            InitError::BufferTooLarge { what, size, max } => write!(
                f,
                "{what} buffer of {size} bytes exceeds the device limit of {max} bytes"
            ),
            InitError::Device(msg) => write!(f, "ui resource creation failed: {msg}"),
        }
    }
}

impl std::error::Error for InitError {}

/// Failure while preparing one frame's UI pass.
///
/// Only the UI pass of the current frame is abandoned; everything is rebuilt
/// from scratch next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// A transient buffer would exceed `max_buffer_size`.
    BufferTooLarge {
        what: &'static str,
        size: u64,
        max: u64,
    },
    /// Upload was requested for geometry with no vertices or no indices.
    EmptyGeometry,
    /// The device failed to create this frame's buffers (typically out of memory).
    Device(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::BufferTooLarge { what, size, max } => write!(
                f,
                "{what} buffer of {size} bytes exceeds the device limit of {max} bytes"
            ),
            FrameError::EmptyGeometry => f.write_str("cannot upload empty ui geometry"),
            FrameError::Device(msg) => write!(f, "ui buffer allocation failed: {msg}"),
        }
    }
}

impl std::error::Error for FrameError {}
