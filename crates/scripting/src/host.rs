//! The seam between the plugin runtime and the client proper.
//!
//! Everything the scripting API can observe or effect in the outside world
//! goes through [`Host`]. The trait carries default no-op implementations
//! so test doubles only override the calls they assert on, and so a
//! headless client can embed the runtime without wiring up windowing.

use mudlark_core::{ApiCode, CircleOp, Color, CursorShape, RectOp, SendTarget};

use crate::marshal::ScriptValue;

/// Which sender collection an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderKind {
    Alias,
    Timer,
    Trigger,
}

impl SenderKind {
    pub fn noun(self) -> &'static str {
        match self {
            SenderKind::Alias => "alias",
            SenderKind::Timer => "timer",
            SenderKind::Trigger => "trigger",
        }
    }
}

/// Outcome of a sender CRUD call, mapped to the kind-specific legacy code
/// by [`SenderAccessResult::into_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderAccessResult {
    Ok,
    /// The operation matched but changed nothing (already enabled, etc.).
    Unchanged,
    NotFound,
    LabelConflict,
    LabelInvalid,
    PatternEmpty,
    BadPattern,
    BadSendTarget,
    BadSequence,
    TimeInvalid,
}

impl SenderAccessResult {
    pub fn into_code(self, kind: SenderKind) -> ApiCode {
        use SenderAccessResult::*;
        match (self, kind) {
            (Ok | Unchanged, _) => ApiCode::Ok,
            (NotFound, SenderKind::Alias) => ApiCode::AliasNotFound,
            (NotFound, SenderKind::Timer) => ApiCode::TimerNotFound,
            (NotFound, SenderKind::Trigger) => ApiCode::TriggerNotFound,
            (LabelConflict, SenderKind::Alias) => ApiCode::AliasAlreadyExists,
            (LabelConflict, SenderKind::Timer) => ApiCode::TimerAlreadyExists,
            (LabelConflict, SenderKind::Trigger) => ApiCode::TriggerAlreadyExists,
            (PatternEmpty, SenderKind::Alias) => ApiCode::AliasCannotBeEmpty,
            (PatternEmpty, SenderKind::Trigger) => ApiCode::TriggerCannotBeEmpty,
            (PatternEmpty, SenderKind::Timer) => ApiCode::TimeInvalid,
            (LabelInvalid, _) => ApiCode::InvalidObjectLabel,
            (BadPattern, _) => ApiCode::BadRegularExpression,
            (BadSendTarget, _) => ApiCode::TriggerSendToInvalid,
            (BadSequence, _) => ApiCode::TriggerSequenceOutOfRange,
            (TimeInvalid, _) => ApiCode::TimeInvalid,
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, SenderAccessResult::Ok | SenderAccessResult::Unchanged)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasSpec {
    pub label: String,
    pub pattern: String,
    pub text: String,
    pub flags: i64,
    pub script: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerSpec {
    pub label: String,
    pub hour: i64,
    pub minute: i64,
    pub second: f64,
    pub text: String,
    pub flags: i64,
    pub script: String,
    pub send_to: SendTarget,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerSpec {
    pub label: String,
    pub pattern: String,
    pub text: String,
    pub flags: i64,
    pub colour: Option<Color>,
    pub wildcard: i64,
    pub sound: String,
    pub script: String,
    pub send_to: SendTarget,
    pub sequence: i64,
}

/// How outgoing text should be treated by the send pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub echo: bool,
    pub log: bool,
    /// Bypass the command queue (SendImmediate).
    pub immediate: bool,
    /// Put at the front of the queue (SendPush).
    pub push: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSpec {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    pub position: i64,
    pub flags: i64,
    pub background: Option<Color>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Hotspot registration. Handler fields are routine *names*; the runtime
/// resolves them at event time so plugin reloads pick up redefinitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotSpec {
    pub id: String,
    pub rect: WindowRect,
    pub mouse_over: String,
    pub cancel_mouse_over: String,
    pub mouse_down: String,
    pub cancel_mouse_down: String,
    pub mouse_up: String,
    pub tooltip: String,
    pub cursor: CursorShape,
    pub flags: i64,
}

/// Client-side surface the runtime drives. All string text is UTF-8; raw
/// server-bound bytes go through the `&[u8]` methods.
#[allow(unused_variables)]
pub trait Host {
    // --- output ------------------------------------------------------

    /// Append a coloured segment and finish the line.
    fn print_note(&mut self, text: &str, fore: Option<Color>, back: Option<Color>) {}

    /// Append a coloured segment without finishing the line.
    fn print_tell(&mut self, text: &str, fore: Option<Color>, back: Option<Color>) {}

    /// Append text containing ANSI SGR sequences.
    fn print_ansi(&mut self, text: &str) {}

    /// Script-facing error channel ("Compile error: …", "Runtime error: …").
    fn print_error(&mut self, message: &str) {}

    /// Feed bytes into the input pipeline as if received from the server.
    fn simulate(&mut self, data: &[u8]) {}

    fn hyperlink(
        &mut self,
        action: &str,
        text: &str,
        hint: &str,
        fore: Option<Color>,
        back: Option<Color>,
        url: bool,
        no_underline: bool,
    ) {
    }

    fn set_status(&mut self, text: &str) {}

    fn set_title(&mut self, text: &str) {}

    fn set_main_title(&mut self, text: &str) {}

    fn lines_in_buffer(&self) -> i64 {
        0
    }

    // --- sending -----------------------------------------------------

    fn send(&mut self, text: &[u8], options: SendOptions) -> ApiCode {
        ApiCode::Ok
    }

    /// Raw packet, no line terminator appended.
    fn send_packet(&mut self, data: &[u8]) -> ApiCode {
        ApiCode::Ok
    }

    /// Process a command as if the user had entered it (alias expansion,
    /// speedwalks). The client re-enters dispatch with an `Execute` source.
    fn execute_command(&mut self, command: &[u8]) -> ApiCode {
        ApiCode::Ok
    }

    // --- senders -----------------------------------------------------

    fn add_alias(&mut self, plugin_id: &str, spec: AliasSpec, replace: bool) -> SenderAccessResult {
        SenderAccessResult::Ok
    }

    fn add_timer(&mut self, plugin_id: &str, spec: TimerSpec, replace: bool) -> SenderAccessResult {
        SenderAccessResult::Ok
    }

    fn add_trigger(
        &mut self,
        plugin_id: &str,
        spec: TriggerSpec,
        replace: bool,
    ) -> SenderAccessResult {
        SenderAccessResult::Ok
    }

    fn delete_sender(&mut self, kind: SenderKind, plugin_id: &str, label: &str) -> SenderAccessResult {
        SenderAccessResult::Ok
    }

    /// Delete every sender in the group; returns how many went away.
    fn delete_sender_group(&mut self, kind: SenderKind, plugin_id: &str, group: &str) -> usize {
        0
    }

    fn delete_temporary_senders(&mut self, kind: SenderKind, plugin_id: &str) -> usize {
        0
    }

    fn enable_sender(
        &mut self,
        kind: SenderKind,
        plugin_id: &str,
        label: &str,
        enabled: bool,
    ) -> SenderAccessResult {
        SenderAccessResult::Ok
    }

    fn enable_sender_group(
        &mut self,
        kind: SenderKind,
        plugin_id: &str,
        group: &str,
        enabled: bool,
    ) -> usize {
        0
    }

    fn sender_exists(&self, kind: SenderKind, plugin_id: &str, label: &str) -> bool {
        false
    }

    fn get_sender_option(
        &self,
        kind: SenderKind,
        plugin_id: &str,
        label: &str,
        option: &str,
    ) -> Result<ScriptValue, ApiCode> {
        Err(ApiCode::UnknownOption)
    }

    fn set_sender_option(
        &mut self,
        kind: SenderKind,
        plugin_id: &str,
        label: &str,
        option: &str,
        value: &str,
    ) -> SenderAccessResult {
        SenderAccessResult::Ok
    }

    fn export_sender_xml(&self, kind: SenderKind, plugin_id: &str, label: &str) -> Result<String, ApiCode> {
        Err(SenderAccessResult::NotFound.into_code(kind))
    }

    fn stop_evaluating_triggers(&mut self, all_plugins: bool) {}

    // --- world options -----------------------------------------------

    fn get_option(&self, name: &str) -> Option<i64> {
        None
    }

    fn set_option(&mut self, name: &str, value: i64) -> ApiCode {
        ApiCode::Ok
    }

    fn get_alpha_option(&self, name: &str) -> Option<String> {
        None
    }

    fn set_alpha_option(&mut self, name: &str, value: &str) -> ApiCode {
        ApiCode::Ok
    }

    // --- palette -----------------------------------------------------

    fn palette_color(&self, bold: bool, index: usize) -> Option<Color> {
        None
    }

    fn set_palette_color(&mut self, bold: bool, index: usize, color: Color) -> ApiCode {
        ApiCode::Ok
    }

    // --- miniwindows -------------------------------------------------

    fn window_create(&mut self, name: &str, spec: WindowSpec) -> ApiCode {
        ApiCode::Ok
    }

    fn window_delete(&mut self, name: &str) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_show(&mut self, name: &str, visible: bool) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_resize(&mut self, name: &str, width: i64, height: i64, background: Option<Color>) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_position(&mut self, name: &str, left: i64, top: i64, position: i64, flags: i64) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_set_z_order(&mut self, name: &str, order: i64) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_rect_op(
        &mut self,
        name: &str,
        op: RectOp,
        rect: WindowRect,
        color1: Option<Color>,
        color2: Option<Color>,
    ) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    #[allow(clippy::too_many_arguments)]
    fn window_circle_op(
        &mut self,
        name: &str,
        op: CircleOp,
        rect: WindowRect,
        pen_color: Option<Color>,
        pen_style: i64,
        pen_width: f64,
        brush_color: Option<Color>,
        brush_style: i64,
        extra: [f64; 4],
    ) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_line(
        &mut self,
        name: &str,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        pen_color: Option<Color>,
        pen_style: i64,
        pen_width: f64,
    ) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    /// Draw text; returns the rendered width in pixels.
    #[allow(clippy::too_many_arguments)]
    fn window_text(
        &mut self,
        name: &str,
        font_id: &str,
        text: &str,
        rect: WindowRect,
        color: Option<Color>,
        unicode: bool,
    ) -> Result<i64, ApiCode> {
        Err(ApiCode::NoSuchWindow)
    }

    fn window_text_width(&self, name: &str, font_id: &str, text: &str, unicode: bool) -> Result<i64, ApiCode> {
        Err(ApiCode::NoSuchWindow)
    }

    #[allow(clippy::too_many_arguments)]
    fn window_font(
        &mut self,
        name: &str,
        font_id: &str,
        font_name: &str,
        size: f64,
        bold: bool,
        italic: bool,
        underline: bool,
        strikeout: bool,
        charset: i64,
        pitch_and_family: i64,
    ) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_load_image(&mut self, name: &str, image_id: &str, path: &str) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    #[allow(clippy::too_many_arguments)]
    fn window_draw_image(
        &mut self,
        name: &str,
        image_id: &str,
        dest: WindowRect,
        mode: i64,
        src: WindowRect,
    ) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_filter(&mut self, name: &str, rect: WindowRect, operation: i64, options: f64) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_add_hotspot(&mut self, name: &str, plugin_index: usize, spec: HotspotSpec) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_move_hotspot(&mut self, name: &str, hotspot_id: &str, rect: WindowRect) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_delete_hotspot(&mut self, name: &str, hotspot_id: &str) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_delete_all_hotspots(&mut self, name: &str) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_drag_handler(
        &mut self,
        name: &str,
        hotspot_id: &str,
        move_routine: &str,
        release_routine: &str,
        flags: i64,
    ) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_scrollwheel_handler(&mut self, name: &str, hotspot_id: &str, routine: &str) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_hotspot_tooltip(&mut self, name: &str, hotspot_id: &str, tooltip: &str) -> ApiCode {
        ApiCode::NoSuchWindow
    }

    fn window_list(&self) -> Vec<String> {
        Vec::new()
    }

    fn window_info(&self, name: &str, code: i64) -> Result<ScriptValue, ApiCode> {
        Err(ApiCode::NoSuchWindow)
    }

    // --- misc --------------------------------------------------------

    fn play_sound(&mut self, path: &str, volume: f64, looping: bool) -> ApiCode {
        ApiCode::CannotPlaySound
    }

    fn stop_sound(&mut self, buffer: i64) -> ApiCode {
        ApiCode::Ok
    }

    fn set_clipboard(&mut self, text: &str) {}

    fn get_clipboard(&self) -> String {
        String::new()
    }

    fn set_cursor(&mut self, shape: CursorShape) {}

    /// World-level GetInfo codes not answered by the runtime itself
    /// (connection state, window metrics, paths).
    fn world_info(&self, code: i64) -> ScriptValue {
        ScriptValue::Nil
    }
}

/// Shared test double. Records what the runtime asked the client to do;
/// tests keep a typed `Rc<RefCell<RecordingHost>>` alongside the erased
/// handle they give the registry.
#[cfg(test)]
pub(crate) mod tests_support {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub struct RecordingHost {
        pub notes: Vec<String>,
        pub tells: Vec<String>,
        pub errors: Vec<String>,
        pub sent: Vec<(Vec<u8>, SendOptions)>,
        pub packets: Vec<Vec<u8>>,
        pub simulated: Vec<Vec<u8>>,
        pub status: String,
        pub clipboard: String,
        pub options: HashMap<String, i64>,
        pub alpha_options: HashMap<String, String>,
        pub info: HashMap<i64, ScriptValue>,
        pub senders: Vec<(SenderKind, String)>,
        pub window_ops: Vec<String>,
    }

    impl Host for RecordingHost {
        fn print_note(&mut self, text: &str, _fore: Option<Color>, _back: Option<Color>) {
            self.notes.push(text.to_owned());
        }

        fn print_tell(&mut self, text: &str, _fore: Option<Color>, _back: Option<Color>) {
            self.tells.push(text.to_owned());
        }

        fn print_error(&mut self, message: &str) {
            self.errors.push(message.to_owned());
        }

        fn simulate(&mut self, data: &[u8]) {
            self.simulated.push(data.to_vec());
        }

        fn set_status(&mut self, text: &str) {
            self.status = text.to_owned();
        }

        fn send(&mut self, text: &[u8], options: SendOptions) -> ApiCode {
            self.sent.push((text.to_vec(), options));
            ApiCode::Ok
        }

        fn send_packet(&mut self, data: &[u8]) -> ApiCode {
            self.packets.push(data.to_vec());
            ApiCode::Ok
        }

        fn add_alias(
            &mut self,
            _plugin_id: &str,
            spec: AliasSpec,
            _replace: bool,
        ) -> SenderAccessResult {
            if spec.pattern.is_empty() {
                return SenderAccessResult::PatternEmpty;
            }
            self.senders.push((SenderKind::Alias, spec.label));
            SenderAccessResult::Ok
        }

        fn add_timer(
            &mut self,
            _plugin_id: &str,
            spec: TimerSpec,
            _replace: bool,
        ) -> SenderAccessResult {
            self.senders.push((SenderKind::Timer, spec.label));
            SenderAccessResult::Ok
        }

        fn add_trigger(
            &mut self,
            _plugin_id: &str,
            spec: TriggerSpec,
            _replace: bool,
        ) -> SenderAccessResult {
            if spec.pattern.is_empty() {
                return SenderAccessResult::PatternEmpty;
            }
            self.senders.push((SenderKind::Trigger, spec.label));
            SenderAccessResult::Ok
        }

        fn delete_sender(
            &mut self,
            kind: SenderKind,
            _plugin_id: &str,
            label: &str,
        ) -> SenderAccessResult {
            let before = self.senders.len();
            self.senders.retain(|(k, l)| *k != kind || l != label);
            if self.senders.len() == before {
                SenderAccessResult::NotFound
            } else {
                SenderAccessResult::Ok
            }
        }

        fn sender_exists(&self, kind: SenderKind, _plugin_id: &str, label: &str) -> bool {
            self.senders.iter().any(|(k, l)| *k == kind && l == label)
        }

        fn get_option(&self, name: &str) -> Option<i64> {
            self.options.get(name).copied()
        }

        fn set_option(&mut self, name: &str, value: i64) -> ApiCode {
            self.options.insert(name.to_owned(), value);
            ApiCode::Ok
        }

        fn get_alpha_option(&self, name: &str) -> Option<String> {
            self.alpha_options.get(name).cloned()
        }

        fn set_alpha_option(&mut self, name: &str, value: &str) -> ApiCode {
            self.alpha_options.insert(name.to_owned(), value.to_owned());
            ApiCode::Ok
        }

        fn set_clipboard(&mut self, text: &str) {
            self.clipboard = text.to_owned();
        }

        fn get_clipboard(&self) -> String {
            self.clipboard.clone()
        }

        fn window_create(&mut self, name: &str, _spec: WindowSpec) -> ApiCode {
            self.window_ops.push(format!("create {name}"));
            ApiCode::Ok
        }

        fn window_add_hotspot(
            &mut self,
            name: &str,
            _plugin_index: usize,
            spec: HotspotSpec,
        ) -> ApiCode {
            self.window_ops.push(format!("hotspot {name}/{}", spec.id));
            ApiCode::Ok
        }

        fn window_drag_handler(
            &mut self,
            name: &str,
            hotspot_id: &str,
            move_routine: &str,
            release_routine: &str,
            _flags: i64,
        ) -> ApiCode {
            self.window_ops.push(format!(
                "drag {name}/{hotspot_id} {move_routine} {release_routine}"
            ));
            ApiCode::Ok
        }

        fn world_info(&self, code: i64) -> ScriptValue {
            self.info.get(&code).cloned().unwrap_or(ScriptValue::Nil)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_result_maps_per_kind() {
        assert_eq!(
            SenderAccessResult::NotFound.into_code(SenderKind::Alias),
            ApiCode::AliasNotFound
        );
        assert_eq!(
            SenderAccessResult::NotFound.into_code(SenderKind::Timer),
            ApiCode::TimerNotFound
        );
        assert_eq!(
            SenderAccessResult::LabelConflict.into_code(SenderKind::Trigger),
            ApiCode::TriggerAlreadyExists
        );
        assert_eq!(
            SenderAccessResult::Unchanged.into_code(SenderKind::Trigger),
            ApiCode::Ok
        );
        assert_eq!(
            SenderAccessResult::BadSequence.into_code(SenderKind::Trigger),
            ApiCode::TriggerSequenceOutOfRange
        );
    }

    struct Minimal;
    impl Host for Minimal {}

    #[test]
    fn test_default_impls_are_benign() {
        let mut host = Minimal;
        host.print_note("hello", None, None);
        assert_eq!(host.send(b"n", SendOptions::default()), ApiCode::Ok);
        assert_eq!(host.window_delete("w"), ApiCode::NoSuchWindow);
        assert_eq!(host.lines_in_buffer(), 0);
        assert_eq!(host.world_info(106), ScriptValue::Nil);
    }
}
