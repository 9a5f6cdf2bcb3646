// Shared leaf types for the Mudlark plugin runtime.
//
// Everything in this crate is framework-agnostic: numeric API codes,
// script-facing enumerations, sender flag bits, the canonical world-option
// table, and colour-code conversions. No Lua, no I/O.

pub mod api_code;
pub mod color;
pub mod enums;
pub mod flags;
pub mod options;

pub use api_code::ApiCode;
pub use color::Color;
pub use enums::{
    ActionSource, BrushStyle, CircleOp, CommandSource, CursorShape, FontFamily, FontPitch,
    ImageOp, PenStyle, RectOp, SendTarget,
};
