//! Sending and sender-CRUD functions: the Send family, alias/timer/trigger
//! management, the DoAfter shortcuts, and regex helpers.

use mlua::{Lua, MultiValue, Result as LuaResult, Table};
use mudlark_core::flags::{has_flag, timer};
use mudlark_core::{ApiCode, SendTarget};

use crate::host::{AliasSpec, SendOptions, SenderKind, TimerSpec, TriggerSpec};
use crate::marshal::{
    concat_strings, expect_max_args, get_bool_or, get_color_or, get_int_or, get_number,
    get_string, get_string_or,
};

use super::ApiContext;

pub(super) fn register(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    register_send_family(lua, globals, ctx)?;
    register_adders(lua, globals, ctx)?;
    register_crud(lua, globals, ctx)?;
    register_do_after(lua, globals, ctx)?;

    {
        let ctx = ctx.clone();
        globals.set(
            "StopEvaluatingTriggers",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "StopEvaluatingTriggers")?;
                let all_plugins = get_bool_or(&args, 1, false)?;
                ctx.host.borrow_mut().stop_evaluating_triggers(all_plugins);
                Ok(())
            })?,
        )?;
    }
    globals.set(
        "MakeRegularExpression",
        lua.create_function(|_, args: MultiValue| {
            expect_max_args(&args, 1, "MakeRegularExpression")?;
            Ok(make_regular_expression(&get_string(&args, 1)?))
        })?,
    )?;
    {
        let ctx = ctx.clone();
        globals.set(
            "ExportXML",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "ExportXML")?;
                let kind = match get_int_or(&args, 1, 0)? {
                    1 => SenderKind::Trigger,
                    2 => SenderKind::Alias,
                    3 => SenderKind::Timer,
                    _ => return Ok(String::new()),
                };
                let label = get_string(&args, 2)?;
                let plugin_id = ctx.plugin_id()?;
                Ok(ctx
                    .host
                    .borrow()
                    .export_sender_xml(kind, &plugin_id, &label)
                    .unwrap_or_default())
            })?,
        )?;
    }
    Ok(())
}

fn register_send_family(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    let variants: [(&str, SendOptions); 5] = [
        (
            "Send",
            SendOptions {
                echo: true,
                ..SendOptions::default()
            },
        ),
        ("SendNoEcho", SendOptions::default()),
        (
            "SendImmediate",
            SendOptions {
                echo: true,
                immediate: true,
                ..SendOptions::default()
            },
        ),
        (
            "SendPush",
            SendOptions {
                echo: true,
                push: true,
                ..SendOptions::default()
            },
        ),
        (
            "LogSend",
            SendOptions {
                echo: true,
                log: true,
                ..SendOptions::default()
            },
        ),
    ];
    for (name, options) in variants {
        let ctx = ctx.clone();
        globals.set(
            name,
            lua.create_function(move |_, args: MultiValue| {
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let text = concat_strings(&args);
                Ok(ctx.host.borrow_mut().send(text.as_bytes(), options).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SendPkt",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "SendPkt")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let packet = crate::marshal::get_bytes(&args, 1)?;
                Ok(ctx.host.borrow_mut().send_packet(&packet).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "Execute",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "Execute")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let command = crate::marshal::get_bytes(&args, 1)?;
                Ok(ctx.host.borrow_mut().execute_command(&command).code())
            })?,
        )?;
    }
    Ok(())
}

fn register_adders(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    {
        let ctx = ctx.clone();
        globals.set(
            "AddAlias",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 5, "AddAlias")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let spec = AliasSpec {
                    label: get_string(&args, 1)?,
                    pattern: get_string(&args, 2)?,
                    text: get_string_or(&args, 3, "")?,
                    flags: get_int_or(&args, 4, 0)?,
                    script: get_string_or(&args, 5, "")?,
                };
                let replace = has_flag(spec.flags, mudlark_core::flags::alias::REPLACE);
                let plugin_id = ctx.plugin_id()?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .add_alias(&plugin_id, spec, replace)
                    .into_code(SenderKind::Alias)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "AddTimer",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 7, "AddTimer")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let spec = TimerSpec {
                    label: get_string(&args, 1)?,
                    hour: get_int_or(&args, 2, 0)?,
                    minute: get_int_or(&args, 3, 0)?,
                    second: crate::marshal::get_number_or(&args, 4, 0.0)?,
                    text: get_string_or(&args, 5, "")?,
                    flags: get_int_or(&args, 6, 0)?,
                    script: get_string_or(&args, 7, "")?,
                    send_to: SendTarget::World,
                };
                if !(0..24).contains(&spec.hour)
                    || !(0..60).contains(&spec.minute)
                    || !(0.0..60.0).contains(&spec.second)
                {
                    return Ok(ApiCode::TimeInvalid.code());
                }
                let replace = has_flag(spec.flags, timer::REPLACE);
                let plugin_id = ctx.plugin_id()?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .add_timer(&plugin_id, spec, replace)
                    .into_code(SenderKind::Timer)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "AddTrigger",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 8, "AddTrigger")?;
                add_trigger(&ctx, &args, SendTarget::World, 100)
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "AddTriggerEx",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 10, "AddTriggerEx")?;
                let Some(send_to) = SendTarget::from_code(get_int_or(&args, 9, 0)?) else {
                    return Ok(ApiCode::TriggerSendToInvalid.code());
                };
                let sequence = get_int_or(&args, 10, 100)?;
                if !(0..=10000).contains(&sequence) {
                    return Ok(ApiCode::TriggerSequenceOutOfRange.code());
                }
                add_trigger(&ctx, &args, send_to, sequence)
            })?,
        )?;
    }
    Ok(())
}

fn add_trigger(
    ctx: &ApiContext,
    args: &MultiValue,
    send_to: SendTarget,
    sequence: i64,
) -> LuaResult<i32> {
    if !ctx.enabled() {
        return Ok(ApiCode::PluginDisabled.code());
    }
    let spec = TriggerSpec {
        label: get_string(args, 1)?,
        pattern: get_string(args, 2)?,
        text: get_string_or(args, 3, "")?,
        flags: get_int_or(args, 4, 0)?,
        colour: get_color_or(args, 5, None)?,
        wildcard: get_int_or(args, 6, 0)?,
        sound: get_string_or(args, 7, "")?,
        script: get_string_or(args, 8, "")?,
        send_to,
        sequence,
    };
    let replace = has_flag(spec.flags, mudlark_core::flags::trigger::REPLACE);
    let plugin_id = ctx.plugin_id()?;
    Ok(ctx
        .host
        .borrow_mut()
        .add_trigger(&plugin_id, spec, replace)
        .into_code(SenderKind::Trigger)
        .code())
}

fn register_crud(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    let kinds = [
        ("Alias", "Aliases", SenderKind::Alias),
        ("Timer", "Timers", SenderKind::Timer),
        ("Trigger", "Triggers", SenderKind::Trigger),
    ];
    for (noun, plural, kind) in kinds {
        {
            let ctx = ctx.clone();
            globals.set(
                format!("Delete{noun}"),
                lua.create_function(move |_, args: MultiValue| {
                    expect_max_args(&args, 1, "Delete")?;
                    if !ctx.enabled() {
                        return Ok(ApiCode::PluginDisabled.code());
                    }
                    let label = get_string(&args, 1)?;
                    let plugin_id = ctx.plugin_id()?;
                    Ok(ctx
                        .host
                        .borrow_mut()
                        .delete_sender(kind, &plugin_id, &label)
                        .into_code(kind)
                        .code())
                })?,
            )?;
        }
        {
            let ctx = ctx.clone();
            globals.set(
                format!("Delete{noun}Group"),
                lua.create_function(move |_, args: MultiValue| {
                    expect_max_args(&args, 1, "DeleteGroup")?;
                    if !ctx.enabled() {
                        return Ok(0);
                    }
                    let group = get_string(&args, 1)?;
                    let plugin_id = ctx.plugin_id()?;
                    Ok(ctx
                        .host
                        .borrow_mut()
                        .delete_sender_group(kind, &plugin_id, &group)
                        as i64)
                })?,
            )?;
        }
        {
            let ctx = ctx.clone();
            globals.set(
                format!("DeleteTemporary{plural}"),
                lua.create_function(move |_, args: MultiValue| {
                    expect_max_args(&args, 0, "DeleteTemporary")?;
                    if !ctx.enabled() {
                        return Ok(0);
                    }
                    let plugin_id = ctx.plugin_id()?;
                    Ok(ctx
                        .host
                        .borrow_mut()
                        .delete_temporary_senders(kind, &plugin_id) as i64)
                })?,
            )?;
        }
        {
            let ctx = ctx.clone();
            globals.set(
                format!("Enable{noun}"),
                lua.create_function(move |_, args: MultiValue| {
                    expect_max_args(&args, 2, "Enable")?;
                    if !ctx.enabled() {
                        return Ok(ApiCode::PluginDisabled.code());
                    }
                    let label = get_string(&args, 1)?;
                    let enabled = get_bool_or(&args, 2, true)?;
                    let plugin_id = ctx.plugin_id()?;
                    Ok(ctx
                        .host
                        .borrow_mut()
                        .enable_sender(kind, &plugin_id, &label, enabled)
                        .into_code(kind)
                        .code())
                })?,
            )?;
        }
        {
            let ctx = ctx.clone();
            globals.set(
                format!("Enable{noun}Group"),
                lua.create_function(move |_, args: MultiValue| {
                    expect_max_args(&args, 2, "EnableGroup")?;
                    if !ctx.enabled() {
                        return Ok(0);
                    }
                    let group = get_string(&args, 1)?;
                    let enabled = get_bool_or(&args, 2, true)?;
                    let plugin_id = ctx.plugin_id()?;
                    Ok(ctx
                        .host
                        .borrow_mut()
                        .enable_sender_group(kind, &plugin_id, &group, enabled)
                        as i64)
                })?,
            )?;
        }
        {
            let ctx = ctx.clone();
            globals.set(
                format!("Is{noun}"),
                lua.create_function(move |_, args: MultiValue| {
                    expect_max_args(&args, 1, "Is")?;
                    let label = get_string(&args, 1)?;
                    let plugin_id = ctx.plugin_id()?;
                    let found = ctx.host.borrow().sender_exists(kind, &plugin_id, &label);
                    Ok(if found {
                        ApiCode::Ok.code()
                    } else {
                        crate::host::SenderAccessResult::NotFound
                            .into_code(kind)
                            .code()
                    })
                })?,
            )?;
        }
        {
            let ctx = ctx.clone();
            globals.set(
                format!("Get{noun}Option"),
                lua.create_function(move |lua, args: MultiValue| {
                    expect_max_args(&args, 2, "GetOption")?;
                    let label = get_string(&args, 1)?;
                    let option = get_string(&args, 2)?;
                    let plugin_id = ctx.plugin_id()?;
                    match ctx
                        .host
                        .borrow()
                        .get_sender_option(kind, &plugin_id, &label, &option)
                    {
                        Ok(value) => value.into_lua(lua),
                        Err(_) => Ok(mlua::Value::Nil),
                    }
                })?,
            )?;
        }
        {
            let ctx = ctx.clone();
            globals.set(
                format!("Set{noun}Option"),
                lua.create_function(move |_, args: MultiValue| {
                    expect_max_args(&args, 3, "SetOption")?;
                    if !ctx.enabled() {
                        return Ok(ApiCode::PluginDisabled.code());
                    }
                    let label = get_string(&args, 1)?;
                    let option = get_string(&args, 2)?;
                    let value = get_string(&args, 3)?;
                    let plugin_id = ctx.plugin_id()?;
                    Ok(ctx
                        .host
                        .borrow_mut()
                        .set_sender_option(kind, &plugin_id, &label, &option, &value)
                        .into_code(kind)
                        .code())
                })?,
            )?;
        }
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "DeleteGroup",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "DeleteGroup")?;
                if !ctx.enabled() {
                    return Ok(0);
                }
                let group = get_string(&args, 1)?;
                let plugin_id = ctx.plugin_id()?;
                let mut host = ctx.host.borrow_mut();
                let mut count = 0i64;
                for kind in [SenderKind::Alias, SenderKind::Timer, SenderKind::Trigger] {
                    count += host.delete_sender_group(kind, &plugin_id, &group) as i64;
                }
                Ok(count)
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "EnableGroup",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "EnableGroup")?;
                if !ctx.enabled() {
                    return Ok(0);
                }
                let group = get_string(&args, 1)?;
                let enabled = get_bool_or(&args, 2, true)?;
                let plugin_id = ctx.plugin_id()?;
                let mut host = ctx.host.borrow_mut();
                let mut count = 0i64;
                for kind in [SenderKind::Alias, SenderKind::Timer, SenderKind::Trigger] {
                    count += host.enable_sender_group(kind, &plugin_id, &group, enabled) as i64;
                }
                Ok(count)
            })?,
        )?;
    }
    Ok(())
}

fn register_do_after(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    let variants: [(&str, SendTarget); 3] = [
        ("DoAfter", SendTarget::World),
        ("DoAfterNote", SendTarget::Output),
        ("DoAfterSpeedwalk", SendTarget::Speedwalk),
    ];
    for (name, send_to) in variants {
        let ctx = ctx.clone();
        globals.set(
            name,
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "DoAfter")?;
                let seconds = get_number(&args, 1)?;
                let text = get_string(&args, 2)?;
                Ok(do_after(&ctx, seconds, text, send_to)?.code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "DoAfterSpecial",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 3, "DoAfterSpecial")?;
                let seconds = get_number(&args, 1)?;
                let text = get_string(&args, 2)?;
                let Some(send_to) = SendTarget::from_code(get_int_or(&args, 3, 0)?) else {
                    return Ok(ApiCode::TriggerSendToInvalid.code());
                };
                Ok(do_after(&ctx, seconds, text, send_to)?.code())
            })?,
        )?;
    }
    Ok(())
}

/// The DoAfter family builds a temporary one-shot timer. The legacy range
/// check: at least 0.1 seconds, under 24 hours.
fn do_after(
    ctx: &ApiContext,
    seconds: f64,
    text: String,
    send_to: SendTarget,
) -> LuaResult<ApiCode> {
    if !ctx.enabled() {
        return Ok(ApiCode::PluginDisabled);
    }
    if !(0.1..86_400.0).contains(&seconds) {
        return Ok(ApiCode::TimeInvalid);
    }
    let total = seconds as i64;
    let spec = TimerSpec {
        label: String::new(),
        hour: total / 3600,
        minute: (total % 3600) / 60,
        second: seconds % 60.0,
        text,
        flags: timer::ENABLED | timer::ONE_SHOT | timer::TEMPORARY,
        script: String::new(),
        send_to,
    };
    let plugin_id = ctx.plugin_id()?;
    Ok(ctx
        .host
        .borrow_mut()
        .add_timer(&plugin_id, spec, false)
        .into_code(SenderKind::Timer))
}

/// Escape PCRE metacharacters so arbitrary text matches literally.
fn make_regular_expression(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if "\\^$.[]()*+?{}|-".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
