//! The watermark themes. Each submodule is one self-contained layout+draw
//! routine over the shared `RenderInput`; all of them express spatial
//! constants in design units scaled by `canvas.width / 1000`.

pub mod custom;
pub mod precision;
pub mod theme1;
pub mod theme2;

use thiserror::Error;

use crate::fonts::FontError;
use crate::map::MapError;

#[derive(Debug, Error)]
pub enum StampError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("image: {0}")]
    Image(String),
    #[error("map: {0}")]
    Map(#[from] MapError),
    #[error("font: {0}")]
    Font(#[from] FontError),
    #[error("internal: {0}")]
    Internal(String),
}

// Placeholders shared by every theme for the session-clock fields.
pub const DATE_PLACEHOLDER: &str = "--/--/----";
pub const TIME_PLACEHOLDER: &str = "--.--";
pub const SERIAL_PLACEHOLDER: &str = "TM-XXXXXXXXXXX";

/// Brand palette used across theme2 and the attribution labels.
pub mod palette {
    use image::Rgba;

    pub const BRAND_YELLOW: Rgba<u8> = Rgba([0xea, 0xb3, 0x08, 255]);
    pub const SLATE_DARK: Rgba<u8> = Rgba([0x1e, 0x29, 0x3b, 255]);
    pub const CHECK_GREEN: Rgba<u8> = Rgba([0x22, 0xc5, 0x5e, 255]);
    pub const PIN_RED: Rgba<u8> = Rgba([0xea, 0x43, 0x35, 255]);
    pub const PIN_RED_DARK: Rgba<u8> = Rgba([0x7a, 0x1b, 0x1b, 255]);
    pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    pub const FLAG_RED: Rgba<u8> = Rgba([0xff, 0, 0, 255]);
}
