//! Argument marshaling between Lua values and host types.
//!
//! Two families live here:
//!
//! - Typed getters over an API call's argument list. Each getter comes in a
//!   required form (missing or wrong-typed argument raises a Lua argument
//!   error, caught by the surrounding protected call) and a defaulted form
//!   (missing or nil yields the supplied default).
//! - `ScriptValue`, the owned primitive representation used to copy values
//!   across interpreter boundaries. Only nil, booleans, numbers, and strings
//!   are copy-safe; everything else is rejected with an error naming the
//!   offending type.

use mlua::{Error as LuaError, Lua, MultiValue, Result as LuaResult, Value};
use mudlark_core::Color;
use serde::{Deserialize, Serialize};

// ============================================================================
// Argument access
// ============================================================================

/// Raise the legacy argument-count error when more than `max` arguments were
/// passed. Excess arguments up to `max` are accepted and ignored.
pub fn expect_max_args(args: &MultiValue, max: usize, fn_name: &str) -> LuaResult<()> {
    if args.len() > max {
        return Err(LuaError::RuntimeError(format!(
            "function '{fn_name}' takes a maximum of {max} arguments"
        )));
    }
    Ok(())
}

fn arg_error(pos: usize, expected: &str, got: &Value) -> LuaError {
    LuaError::RuntimeError(format!(
        "bad argument #{pos} ({expected} expected, got {})",
        got.type_name()
    ))
}

fn arg(args: &MultiValue, pos: usize) -> &Value {
    // Lua pads missing arguments with nil.
    args.get(pos - 1).unwrap_or(&Value::Nil)
}

/// Required string argument (1-based). Numbers coerce, as `lua_tolstring`
/// would.
pub fn get_string(args: &MultiValue, pos: usize) -> LuaResult<String> {
    let value = arg(args, pos);
    match value {
        Value::String(s) => Ok(s.to_string_lossy().to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Number(n) => Ok(number_to_string(*n)),
        other => Err(arg_error(pos, "string", other)),
    }
}

/// Optional string argument: nil/absent yields the default.
pub fn get_string_or(args: &MultiValue, pos: usize, default: &str) -> LuaResult<String> {
    match arg(args, pos) {
        Value::Nil => Ok(default.to_string()),
        _ => get_string(args, pos),
    }
}

/// Required byte-string argument. Unlike `get_string`, no UTF-8 requirement.
pub fn get_bytes(args: &MultiValue, pos: usize) -> LuaResult<Vec<u8>> {
    let value = arg(args, pos);
    match value {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        Value::Integer(i) => Ok(i.to_string().into_bytes()),
        Value::Number(n) => Ok(number_to_string(*n).into_bytes()),
        other => Err(arg_error(pos, "string", other)),
    }
}

pub fn get_bytes_or(args: &MultiValue, pos: usize, default: &[u8]) -> LuaResult<Vec<u8>> {
    match arg(args, pos) {
        Value::Nil => Ok(default.to_vec()),
        _ => get_bytes(args, pos),
    }
}

/// Required integer argument. Doubles truncate toward zero the way
/// `lua_tointeger` does; numeric strings are accepted.
pub fn get_int(args: &MultiValue, pos: usize) -> LuaResult<i64> {
    let value = arg(args, pos);
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Number(n) => Ok(*n as i64),
        Value::String(s) => {
            let text = s.to_string_lossy();
            let text = text.trim();
            text.parse::<i64>()
                .or_else(|_| text.parse::<f64>().map(|n| n as i64))
                .map_err(|_| arg_error(pos, "number", value))
        }
        other => Err(arg_error(pos, "number", other)),
    }
}

pub fn get_int_or(args: &MultiValue, pos: usize, default: i64) -> LuaResult<i64> {
    match arg(args, pos) {
        Value::Nil => Ok(default),
        _ => get_int(args, pos),
    }
}

pub fn get_number(args: &MultiValue, pos: usize) -> LuaResult<f64> {
    let value = arg(args, pos);
    match value {
        Value::Integer(i) => Ok(*i as f64),
        Value::Number(n) => Ok(*n),
        Value::String(s) => s
            .to_string_lossy()
            .trim()
            .parse::<f64>()
            .map_err(|_| arg_error(pos, "number", value)),
        other => Err(arg_error(pos, "number", other)),
    }
}

pub fn get_number_or(args: &MultiValue, pos: usize, default: f64) -> LuaResult<f64> {
    match arg(args, pos) {
        Value::Nil => Ok(default),
        _ => get_number(args, pos),
    }
}

/// Required boolean: only booleans qualify (the legacy getter rejects
/// truthy non-booleans to catch argument-order mistakes).
pub fn get_bool(args: &MultiValue, pos: usize) -> LuaResult<bool> {
    match arg(args, pos) {
        Value::Boolean(b) => Ok(*b),
        Value::Integer(0) => Ok(false),
        Value::Integer(1) => Ok(true),
        other => Err(arg_error(pos, "boolean", other)),
    }
}

pub fn get_bool_or(args: &MultiValue, pos: usize, default: bool) -> LuaResult<bool> {
    match arg(args, pos) {
        Value::Nil => Ok(default),
        _ => get_bool(args, pos),
    }
}

/// Required colour: a legacy BGR code or a recognized colour name.
pub fn get_color(args: &MultiValue, pos: usize) -> LuaResult<Color> {
    get_color_or(args, pos, None)?.ok_or_else(|| arg_error(pos, "colour", arg(args, pos)))
}

/// Colour argument: either a legacy BGR code or a colour name. Nil/absent
/// yields the default. Unrecognized names yield `None` ("no colour"),
/// letting call sites answer BadParameter.
pub fn get_color_or(
    args: &MultiValue,
    pos: usize,
    default: Option<Color>,
) -> LuaResult<Option<Color>> {
    match arg(args, pos) {
        Value::Nil => Ok(default),
        Value::Integer(i) => Ok(Color::from_code(*i)),
        Value::Number(n) => Ok(Color::from_code(*n as i64)),
        Value::String(s) => Ok(mudlark_core::color::named_color(&s.to_string_lossy())),
        other => Err(arg_error(pos, "colour", other)),
    }
}

/// Concatenate all arguments as display text, the way Note/Tell do.
pub fn concat_strings(args: &MultiValue) -> String {
    let mut out = String::new();
    for value in args.iter() {
        match value {
            Value::Nil => (),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(i) => out.push_str(&i.to_string()),
            Value::Number(n) => out.push_str(&number_to_string(*n)),
            Value::String(s) => out.push_str(&s.to_string_lossy()),
            other => out.push_str(other.type_name()),
        }
    }
    out
}

/// Lua truthiness: nil and false are falsey, everything else truthy.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Nil | Value::Boolean(false))
}

fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

// ============================================================================
// Cross-interpreter values
// ============================================================================

/// An owned primitive script value.
///
/// This is the only shape of data permitted to cross an interpreter
/// boundary (CallPlugin arguments and results, deferred-callback argument
/// capture): copying a table or function between independent Lua heaps is
/// not meaningful, so those are rejected up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    Nil,
    Bool(bool),
    Int(i64),
    Number(f64),
    String(Vec<u8>),
}

impl ScriptValue {
    /// Convert from a Lua value, rejecting non-primitives with the Lua type
    /// name of the offender.
    pub fn from_lua(value: &Value) -> Result<ScriptValue, &'static str> {
        match value {
            Value::Nil => Ok(ScriptValue::Nil),
            Value::Boolean(b) => Ok(ScriptValue::Bool(*b)),
            Value::Integer(i) => Ok(ScriptValue::Int(*i)),
            Value::Number(n) => Ok(ScriptValue::Number(*n)),
            Value::String(s) => Ok(ScriptValue::String(s.as_bytes().to_vec())),
            other => Err(other.type_name()),
        }
    }

    /// Materialize in a (possibly different) interpreter.
    pub fn into_lua(&self, lua: &Lua) -> LuaResult<Value> {
        Ok(match self {
            ScriptValue::Nil => Value::Nil,
            ScriptValue::Bool(b) => Value::Boolean(*b),
            ScriptValue::Int(i) => Value::Integer(*i),
            ScriptValue::Number(n) => Value::Number(*n),
            ScriptValue::String(bytes) => Value::String(lua.create_string(bytes)?),
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }
}

/// Convert a full argument list, reporting the 1-based position of the first
/// non-primitive.
pub fn values_from_lua(args: &[Value]) -> Result<Vec<ScriptValue>, (usize, &'static str)> {
    args.iter()
        .enumerate()
        .map(|(i, value)| ScriptValue::from_lua(value).map_err(|ty| (i + 1, ty)))
        .collect()
}

/// Materialize a list of primitives as call arguments.
pub fn values_into_lua(lua: &Lua, values: &[ScriptValue]) -> LuaResult<MultiValue> {
    values
        .iter()
        .map(|value| value.into_lua(lua))
        .collect::<LuaResult<MultiValue>>()
}
