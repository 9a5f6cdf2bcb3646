//! Informational and world-state functions: GetInfo, Version, unique
//! numbers, world options, sound, clipboard, cursor, trace output.

use mlua::{Lua, MultiValue, Result as LuaResult, Table, Value};
use mudlark_core::enums::CursorShape;
use mudlark_core::options::{canonical_name, OptionKind, ALPHA_OPTIONS, NUMERIC_OPTIONS};
use mudlark_core::ApiCode;

use crate::marshal::{
    concat_strings, expect_max_args, get_bool_or, get_int, get_number_or, get_string,
    get_string_or, ScriptValue,
};

use super::ApiContext;

/// Language level reported by `GetInfo(72)`.
const SCRIPTING_VERSION: &str = "5.4";

/// Host platform for `GetInfo(268)`: the legacy numbering, extended.
const OS_CODE: i64 = if cfg!(windows) {
    2
} else if cfg!(target_os = "macos") {
    100
} else {
    200
};

pub(super) fn register(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    globals.set(
        "Version",
        lua.create_function(|_, ()| Ok(env!("CARGO_PKG_VERSION").to_owned()))?,
    )?;
    {
        let ctx = ctx.clone();
        globals.set(
            "GetInfo",
            lua.create_function(move |lua, args: MultiValue| {
                expect_max_args(&args, 1, "GetInfo")?;
                get_info(&ctx, lua, get_int(&args, 1)?)
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetUniqueNumber",
            lua.create_function(move |_, ()| Ok(ctx.registry()?.next_unique_number()))?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetUniqueID",
            lua.create_function(move |_, ()| {
                let nanos = chrono::Utc::now()
                    .timestamp_nanos_opt()
                    .unwrap_or_default();
                Ok(format!(
                    "{:016x}{:08x}",
                    nanos,
                    ctx.registry()?.next_unique_number() as u32
                ))
            })?,
        )?;
    }

    // --- sound -------------------------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "PlaySound",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 5, "PlaySound")?;
                // buffer number in argument 1 is accepted and ignored
                let path = get_string_or(&args, 2, "")?;
                let looping = get_bool_or(&args, 3, false)?;
                let volume = get_number_or(&args, 4, 100.0)?;
                Ok(ctx.host.borrow_mut().play_sound(&path, volume, looping).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "Sound",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "Sound")?;
                let path = get_string(&args, 1)?;
                Ok(ctx.host.borrow_mut().play_sound(&path, 100.0, false).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "StopSound",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "StopSound")?;
                let buffer = crate::marshal::get_int_or(&args, 1, 0)?;
                Ok(ctx.host.borrow_mut().stop_sound(buffer).code())
            })?,
        )?;
    }

    // --- clipboard and cursor ----------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "SetClipboard",
            lua.create_function(move |_, args: MultiValue| {
                ctx.host.borrow_mut().set_clipboard(&concat_strings(&args));
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetClipboard",
            lua.create_function(move |_, ()| Ok(ctx.host.borrow().get_clipboard()))?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetCursor",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "SetCursor")?;
                let Some(shape) = CursorShape::from_code(get_int(&args, 1)?) else {
                    return Ok(ApiCode::BadParameter.code());
                };
                ctx.host.borrow_mut().set_cursor(shape);
                Ok(ApiCode::Ok.code())
            })?,
        )?;
    }

    // --- world options -----------------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "GetOption",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "GetOption")?;
                let name = get_string(&args, 1)?;
                Ok(match canonical_name(&name) {
                    Some((canonical, OptionKind::Numeric | OptionKind::Both)) => {
                        ctx.host.borrow().get_option(canonical).unwrap_or(0)
                    }
                    _ => -1,
                })
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetOption",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "SetOption")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let name = get_string(&args, 1)?;
                let value = get_int(&args, 2)?;
                Ok(match canonical_name(&name) {
                    Some((canonical, OptionKind::Numeric | OptionKind::Both)) => {
                        ctx.host.borrow_mut().set_option(canonical, value).code()
                    }
                    _ => ApiCode::UnknownOption.code(),
                })
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetAlphaOption",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "GetAlphaOption")?;
                let name = get_string(&args, 1)?;
                Ok(match canonical_name(&name) {
                    Some((canonical, OptionKind::Alpha | OptionKind::Both)) => ctx
                        .host
                        .borrow()
                        .get_alpha_option(canonical)
                        .unwrap_or_default(),
                    _ => String::new(),
                })
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetAlphaOption",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "SetAlphaOption")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let name = get_string(&args, 1)?;
                let value = get_string(&args, 2)?;
                Ok(match canonical_name(&name) {
                    Some((canonical, OptionKind::Alpha | OptionKind::Both)) => ctx
                        .host
                        .borrow_mut()
                        .set_alpha_option(canonical, &value)
                        .code(),
                    _ => ApiCode::UnknownOption.code(),
                })
            })?,
        )?;
    }
    globals.set(
        "GetOptionList",
        lua.create_function(|lua, ()| {
            lua.create_sequence_from(NUMERIC_OPTIONS.iter().copied())
        })?,
    )?;
    globals.set(
        "GetAlphaOptionList",
        lua.create_function(|lua, ()| {
            lua.create_sequence_from(ALPHA_OPTIONS.iter().copied())
        })?,
    )?;
    {
        let ctx = ctx.clone();
        globals.set(
            "GetCurrentValue",
            lua.create_function(move |lua, args: MultiValue| {
                expect_max_args(&args, 1, "GetCurrentValue")?;
                let name = get_string(&args, 1)?;
                Ok(match canonical_name(&name) {
                    Some((canonical, OptionKind::Numeric)) => {
                        Value::Integer(ctx.host.borrow().get_option(canonical).unwrap_or(0))
                    }
                    Some((canonical, OptionKind::Alpha | OptionKind::Both)) => {
                        match ctx.host.borrow().get_alpha_option(canonical) {
                            Some(value) => Value::String(lua.create_string(&value)?),
                            None => Value::Integer(
                                ctx.host.borrow().get_option(canonical).unwrap_or(0),
                            ),
                        }
                    }
                    None => Value::Nil,
                })
            })?,
        )?;
    }

    // --- trace -------------------------------------------------------

    globals.set(
        "Trace",
        lua.create_function(|_, args: MultiValue| {
            log::trace!("{}", concat_strings(&args));
            Ok(())
        })?,
    )?;
    globals.set(
        "TraceOut",
        lua.create_function(|_, args: MultiValue| {
            log::debug!("{}", concat_strings(&args));
            Ok(())
        })?,
    )?;

    Ok(())
}

fn get_info(ctx: &ApiContext, lua: &Lua, code: i64) -> LuaResult<Value> {
    Ok(match code {
        72 => Value::String(lua.create_string(SCRIPTING_VERSION)?),
        106 => match ctx.registry.upgrade() {
            None => Value::Boolean(true),
            Some(_) => match ctx.host.borrow().world_info(106) {
                ScriptValue::Bool(closed) => Value::Boolean(closed),
                _ => Value::Boolean(false),
            },
        },
        239 => Value::Integer(ctx.registry()?.action_source() as i64),
        268 => Value::Integer(OS_CODE),
        _ => ctx.host.borrow().world_info(code).into_lua(lua)?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::tests::api_fixture;
    use super::*;

    #[test]
    fn test_get_info_runtime_codes() {
        let (host, _registry, plugin) = api_fixture();
        host.borrow_mut()
            .info
            .insert(280, ScriptValue::Int(40));
        plugin.run_script(
            "version = GetInfo(72)\n\
             closed = GetInfo(106)\n\
             source = GetInfo(239)\n\
             height = GetInfo(280)\n\
             unknown = GetInfo(9999)",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<String>("version").unwrap(), "5.4");
        assert!(!lua.globals().get::<bool>("closed").unwrap());
        assert_eq!(lua.globals().get::<i64>("source").unwrap(), 0);
        assert_eq!(lua.globals().get::<i64>("height").unwrap(), 40);
        assert!(lua.globals().get::<Value>("unknown").unwrap().is_nil());
    }

    #[test]
    fn test_option_round_trip_and_unknown() {
        let (_host, _registry, plugin) = api_fixture();
        plugin.run_script(
            "a = SetOption('enable_triggers', 1)\n\
             b = GetOption('enable_triggers')\n\
             c = SetOption('no_such_option', 1)\n\
             d = GetOption('no_such_option')",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<i64>("a").unwrap(), 0);
        assert_eq!(lua.globals().get::<i64>("b").unwrap(), 1);
        assert_eq!(
            lua.globals().get::<i64>("c").unwrap(),
            i64::from(ApiCode::UnknownOption.code())
        );
        assert_eq!(lua.globals().get::<i64>("d").unwrap(), -1);
    }

    #[test]
    fn test_alpha_option_and_current_value() {
        let (_host, _registry, plugin) = api_fixture();
        plugin.run_script(
            "SetAlphaOption('site', 'mud.example.com')\n\
             site = GetAlphaOption('site')\n\
             current = GetCurrentValue('site')",
        );
        let lua = plugin.lua();
        assert_eq!(
            lua.globals().get::<String>("site").unwrap(),
            "mud.example.com"
        );
        assert_eq!(
            lua.globals().get::<String>("current").unwrap(),
            "mud.example.com"
        );
    }

    #[test]
    fn test_option_lists_are_tables() {
        let (_host, _registry, plugin) = api_fixture();
        plugin.run_script("n = #GetOptionList(); a = #GetAlphaOptionList()");
        let lua = plugin.lua();
        assert_eq!(
            lua.globals().get::<i64>("n").unwrap(),
            NUMERIC_OPTIONS.len() as i64
        );
        assert_eq!(
            lua.globals().get::<i64>("a").unwrap(),
            ALPHA_OPTIONS.len() as i64
        );
    }

    #[test]
    fn test_unique_numbers_and_id() {
        let (_host, _registry, plugin) = api_fixture();
        plugin.run_script(
            "a = GetUniqueNumber(); b = GetUniqueNumber(); id = GetUniqueID()",
        );
        let lua = plugin.lua();
        let a: i64 = lua.globals().get("a").unwrap();
        let b: i64 = lua.globals().get("b").unwrap();
        assert_eq!(b, a + 1);
        let id: String = lua.globals().get("id").unwrap();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_clipboard_round_trip() {
        let (_host, _registry, plugin) = api_fixture();
        plugin.run_script("SetClipboard('copied'); back = GetClipboard()");
        assert_eq!(
            plugin.lua().globals().get::<String>("back").unwrap(),
            "copied"
        );
    }
}
