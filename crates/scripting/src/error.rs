//! Script error classification and formatting.
//!
//! Compile and runtime errors are reported through the host's `print_error`
//! and recovered; the one exception is interpreter memory exhaustion, which
//! is unrecoverable and propagated as a panic rather than swallowed.

use mlua::Error as LuaError;

/// Result of executing a top-level script chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Ok,
    /// Malformed source; the chunk never ran.
    CompileError,
    /// The chunk compiled but raised while running. Disabled plugins and
    /// empty sources also report this: they fail without touching the
    /// interpreter.
    RuntimeError,
}

impl ScriptOutcome {
    pub const fn is_ok(self) -> bool {
        matches!(self, ScriptOutcome::Ok)
    }
}

/// Strip the `[string "..."]:1: ` location prefix mlua puts on chunk errors.
fn strip_chunk_prefix(message: &str) -> &str {
    match message.find("]:") {
        Some(idx) => match message[idx..].find(": ") {
            Some(sep) => &message[idx + sep + 2..],
            None => message,
        },
        None => message,
    }
}

/// Flatten a Lua error into a single displayable line.
pub fn format_lua_error(error: &LuaError) -> String {
    match error {
        LuaError::SyntaxError { message, .. } => strip_chunk_prefix(message).to_string(),
        LuaError::RuntimeError(message) => message.clone(),
        LuaError::CallbackError { cause, .. } => format_lua_error(cause),
        LuaError::WithContext { cause, .. } => format_lua_error(cause),
        other => other.to_string(),
    }
}

pub fn format_compile_error(error: &LuaError) -> String {
    format!("Compile error: {}", format_lua_error(error))
}

pub fn format_runtime_error(error: &LuaError) -> String {
    format!("Runtime error: {}", format_lua_error(error))
}

/// Interpreter memory exhaustion is the one unrecoverable script failure.
/// Everything else is reported and recovered at the plugin boundary.
pub fn check_fatal(error: &LuaError) {
    if let LuaError::MemoryError(message) = error {
        panic!("out of memory in Lua interpreter: {message}");
    }
}
