//! Script-facing enumerations.
//!
//! Discriminant values come from the legacy API and are visible to plugin
//! scripts (pen styles, brush patterns, rect ops, and so on), so they are
//! fixed.

use serde::{Deserialize, Serialize};

/// What kind of action triggered the current script execution.
///
/// Exposed to scripts via `GetInfo(239)` while a callback is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionSource {
    /// No particular reason, could be plugin saving
    #[default]
    Unknown,
    /// User typed something in the command area and pressed Enter
    UserTyping,
    /// User typed a macro (e.g. F2) (unused)
    UserMacro,
    /// User used the numeric keypad
    UserKeypad,
    /// User used a hotkey (unused)
    UserAccelerator,
    /// Item chosen from pop-up menu
    UserMenuAction,
    /// Trigger fired
    TriggerFired,
    /// Timer fired
    TimerFired,
    /// Input arrived (eg. packet received)
    InputFromServer,
    /// Some sort of world action (e.g. world open, connect, got focus)
    WorldAction,
    /// Executing Lua sandbox (unused)
    LuaSandbox,
    /// Hotspot callback
    Hotspot,
}

/// Where a user command originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandSource {
    User,
    Execute,
    Hotkey,
    Link,
}

impl CommandSource {
    /// The action source a command-related callback reports for this origin.
    pub const fn action(self) -> ActionSource {
        match self {
            CommandSource::User => ActionSource::UserTyping,
            _ => ActionSource::UserKeypad,
        }
    }
}

/// Destination for text produced by a matched alias/timer/trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SendTarget {
    #[default]
    World = 0,
    Command,
    Output,
    Status,
    NotepadNew,
    NotepadAppend,
    Log,
    NotepadReplace,
    CommandQueue,
    Variable,
    Execute,
    Speedwalk,
    Script,
    Immediate,
    ScriptAfterOmit,
}

impl SendTarget {
    pub fn from_code(code: i64) -> Option<SendTarget> {
        Some(match code {
            0 => SendTarget::World,
            1 => SendTarget::Command,
            2 => SendTarget::Output,
            3 => SendTarget::Status,
            4 => SendTarget::NotepadNew,
            5 => SendTarget::NotepadAppend,
            6 => SendTarget::Log,
            7 => SendTarget::NotepadReplace,
            8 => SendTarget::CommandQueue,
            9 => SendTarget::Variable,
            10 => SendTarget::Execute,
            11 => SendTarget::Speedwalk,
            12 => SendTarget::Script,
            13 => SendTarget::Immediate,
            14 => SendTarget::ScriptAfterOmit,
            _ => return None,
        })
    }
}

/// Shape drawn by `WindowRectOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum RectOp {
    /// Frame by a single pixel wide line
    Frame = 1,
    /// Fill the entire rectangle
    Fill,
    /// Invert the colors inside the rectangle
    Invert,
    /// Draw a "3D-style" rectangle in two colors, a single pixel wide
    Frame3D,
}

impl RectOp {
    pub fn from_code(code: i64) -> Option<RectOp> {
        Some(match code {
            1 => RectOp::Frame,
            2 => RectOp::Fill,
            3 => RectOp::Invert,
            4 => RectOp::Frame3D,
            _ => return None,
        })
    }
}

/// Shape drawn by `WindowCircleOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CircleOp {
    Ellipse = 1,
    Rectangle,
    RoundedRectangle,
    Chord,
    Pie,
}

impl CircleOp {
    pub fn from_code(code: i64) -> Option<CircleOp> {
        Some(match code {
            1 => CircleOp::Ellipse,
            2 => CircleOp::Rectangle,
            3 => CircleOp::RoundedRectangle,
            4 => CircleOp::Chord,
            5 => CircleOp::Pie,
            _ => return None,
        })
    }
}

/// Mask shape used by `WindowImageOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ImageOp {
    Ellipse = 1,
    Rectangle,
    RoundedRectangle,
}

impl ImageOp {
    pub fn from_code(code: i64) -> Option<ImageOp> {
        Some(match code {
            1 => ImageOp::Ellipse,
            2 => ImageOp::Rectangle,
            3 => ImageOp::RoundedRectangle,
            _ => return None,
        })
    }
}

/// Pen line styles for drawing operations.
///
/// The low byte selects the line style; cap and join flags live in higher
/// bits (bitwise-or'ed in by scripts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum PenStyle {
    SolidLine = 0,
    DashLine = 1,
    DotLine = 2,
    DashDotLine = 3,
    DashDotDotLine = 4,
    NoPen = 5,
    InsideFrame = 6,
}

impl PenStyle {
    pub const ROUND_CAP: i64 = 0x000;
    pub const SQUARE_CAP: i64 = 0x100;
    pub const FLAT_CAP: i64 = 0x200;
    pub const ROUND_JOIN: i64 = 0x0000;
    pub const BEVEL_JOIN: i64 = 0x1000;
    pub const MITER_JOIN: i64 = 0x2000;

    /// Decode the style portion of a pen parameter. Returns `None` when the
    /// low byte does not name a valid style (PenStyleNotValid upstream).
    pub fn from_code(code: i64) -> Option<PenStyle> {
        Some(match code & 0xFF {
            0 => PenStyle::SolidLine,
            1 => PenStyle::DashLine,
            2 => PenStyle::DotLine,
            3 => PenStyle::DashDotLine,
            4 => PenStyle::DashDotDotLine,
            5 => PenStyle::NoPen,
            6 => PenStyle::InsideFrame,
            _ => return None,
        })
    }
}

/// Brush fill patterns for drawing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BrushStyle {
    SolidPattern = 0,
    NoBrush,
    HorPattern,
    VerPattern,
    FDiagPattern,
    BDiagPattern,
    CrossPattern,
    DiagCrossPattern,
    Dense4Pattern,
    Dense2Pattern,
    Dense1Pattern,
    HorWaves,
    VerWaves,
}

impl BrushStyle {
    pub fn from_code(code: i64) -> Option<BrushStyle> {
        Some(match code {
            0 => BrushStyle::SolidPattern,
            1 => BrushStyle::NoBrush,
            2 => BrushStyle::HorPattern,
            3 => BrushStyle::VerPattern,
            4 => BrushStyle::FDiagPattern,
            5 => BrushStyle::BDiagPattern,
            6 => BrushStyle::CrossPattern,
            7 => BrushStyle::DiagCrossPattern,
            8 => BrushStyle::Dense4Pattern,
            9 => BrushStyle::Dense2Pattern,
            10 => BrushStyle::Dense1Pattern,
            11 => BrushStyle::HorWaves,
            12 => BrushStyle::VerWaves,
            _ => return None,
        })
    }
}

/// Mouse cursor shapes selectable through hotspots and `SetCursor`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i8)]
pub enum CursorShape {
    Blank = -1,
    #[default]
    Arrow = 0,
    OpenHand,
    IBeam,
    Cross,
    Wait,
    UpArrow,
    SizeFDiag,
    SizeBDiag,
    SizeHor,
    SizeVer,
    SizeAll,
    Forbidden,
    WhatsThis,
}

impl CursorShape {
    pub fn from_code(code: i64) -> Option<CursorShape> {
        Some(match code {
            -1 => CursorShape::Blank,
            0 => CursorShape::Arrow,
            1 => CursorShape::OpenHand,
            2 => CursorShape::IBeam,
            3 => CursorShape::Cross,
            4 => CursorShape::Wait,
            5 => CursorShape::UpArrow,
            6 => CursorShape::SizeFDiag,
            7 => CursorShape::SizeBDiag,
            8 => CursorShape::SizeHor,
            9 => CursorShape::SizeVer,
            10 => CursorShape::SizeAll,
            11 => CursorShape::Forbidden,
            12 => CursorShape::WhatsThis,
            _ => return None,
        })
    }
}

/// Font pitch flags for `WindowFont` / `AddFont`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FontPitch {
    Default = 0,
    Fixed = 1,
    Variable = 2,
    Monospace = 8,
}

/// Font family hint flags for `WindowFont` / `AddFont`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FontFamily {
    AnyFamily = 0,
    Roman = 16,
    Swiss = 32,
    Modern = 48,
    Script = 64,
    Decorative = 80,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_action() {
        assert_eq!(CommandSource::User.action(), ActionSource::UserTyping);
        assert_eq!(CommandSource::Execute.action(), ActionSource::UserKeypad);
        assert_eq!(CommandSource::Hotkey.action(), ActionSource::UserKeypad);
        assert_eq!(CommandSource::Link.action(), ActionSource::UserKeypad);
    }

    #[test]
    fn test_pen_style_masks_cap_and_join() {
        assert_eq!(
            PenStyle::from_code(2 | PenStyle::SQUARE_CAP | PenStyle::MITER_JOIN),
            Some(PenStyle::DotLine)
        );
        assert_eq!(PenStyle::from_code(7), None);
    }

    #[test]
    fn test_send_target_bounds() {
        assert_eq!(SendTarget::from_code(0), Some(SendTarget::World));
        assert_eq!(SendTarget::from_code(14), Some(SendTarget::ScriptAfterOmit));
        assert_eq!(SendTarget::from_code(15), None);
        assert_eq!(SendTarget::from_code(-1), None);
    }

    #[test]
    fn test_rect_op_zero_is_invalid() {
        assert_eq!(RectOp::from_code(0), None);
        assert_eq!(RectOp::from_code(4), Some(RectOp::Frame3D));
    }
}
