//! The canonical world-option name table.
//!
//! `GetOption`/`SetOption` address world settings by snake_case name. The
//! table is split into numeric options and alpha (string) options; a few
//! colour-valued options appear in both, matching the legacy behavior of
//! exposing a colour as either its numeric code or its name.

/// Numeric world options, sorted, as reported by `GetOptionList`.
pub const NUMERIC_OPTIONS: &[&str] = &[
    "auto_pause",
    "carriage_return_clears_line",
    "command_stack_enabled",
    "confirm_on_send",
    "connect_method",
    "custom_color",
    "detect_pueblo",
    "disable_compression",
    "display_my_input",
    "echo_color",
    "echo_hyperlink_in_output_window",
    "enable_aliases",
    "enable_command_stack",
    "enable_speed_walk",
    "enable_timers",
    "enable_triggers",
    "error_colour",
    "history_lines",
    "indent_paras",
    "input_background_colour",
    "input_text_colour",
    "keep_commands_on_same_line",
    "line_spacing",
    "log_in_colour",
    "log_line_preamble_output",
    "lower_case_tab_completion",
    "naws",
    "no_echo_off",
    "note_text_colour",
    "output_font_height",
    "pixel_offset",
    "port",
    "proxy_port",
    "save_world_automatically",
    "send_mxp_afk_response",
    "show_bold",
    "show_connect_disconnect",
    "show_italic",
    "show_underline",
    "tab_completion_lines",
    "translate_backslash_sequences",
    "underline_hyperlinks",
    "unpause_on_send",
    "use_default_aliases",
    "use_default_colours",
    "use_default_macros",
    "use_default_timers",
    "use_default_triggers",
    "use_mxp",
    "utf_8",
    "wrap",
    "wrap_column",
    "write_world_name_to_log",
];

/// String-valued world options, sorted, as reported by `GetAlphaOptionList`.
pub const ALPHA_OPTIONS: &[&str] = &[
    "auto_say_string",
    "command_stack_character",
    "connect_text",
    "custom_color",
    "echo_color",
    "error_colour",
    "input_background_colour",
    "input_font_name",
    "input_text_colour",
    "log_file_postamble",
    "log_file_preamble",
    "log_line_preamble_input",
    "log_line_preamble_notes",
    "name",
    "new_activity_sound",
    "note_text_colour",
    "notes",
    "output_font_name",
    "player",
    "proxy_server",
    "proxy_username",
    "script_prefix",
    "site",
    "speed_walk_delay",
    "speed_walk_filler",
    "speed_walk_prefix",
    "terminal_identification",
    "world_script",
];

/// How a given option may be addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Numeric,
    Alpha,
    /// Colour options answer to both the numeric and alpha accessors.
    Both,
}

/// Look up an option name, returning its canonical form and kind.
/// Unknown names map to `UnknownOption` at the API boundary.
pub fn canonical_name(name: &str) -> Option<(&'static str, OptionKind)> {
    let numeric = NUMERIC_OPTIONS.binary_search(&name).ok();
    let alpha = ALPHA_OPTIONS.binary_search(&name).ok();
    match (numeric, alpha) {
        (Some(i), None) => Some((NUMERIC_OPTIONS[i], OptionKind::Numeric)),
        (None, Some(i)) => Some((ALPHA_OPTIONS[i], OptionKind::Alpha)),
        (Some(i), Some(_)) => Some((NUMERIC_OPTIONS[i], OptionKind::Both)),
        (None, None) => None,
    }
}
