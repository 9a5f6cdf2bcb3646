//! Plugin-to-plugin functions: variables, identity queries, enable state,
//! broadcasts, and cross-plugin routine calls.

use mlua::{Lua, MultiValue, Result as LuaResult, Table, Value};
use mudlark_core::ApiCode;

use crate::marshal::{expect_max_args, get_int, get_string, get_string_or, values_from_lua};
use crate::thread::CallPluginResult;

use super::ApiContext;

pub(super) fn register(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    // --- variables ---------------------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "GetVariable",
            lua.create_function(move |lua, args: MultiValue| {
                expect_max_args(&args, 1, "GetVariable")?;
                let name = get_string(&args, 1)?;
                let plugin_id = ctx.plugin_id()?;
                Ok(match ctx.registry()?.get_variable(&plugin_id, &name) {
                    Some(value) => Value::String(lua.create_string(&value)?),
                    None => Value::Nil,
                })
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetVariable",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "SetVariable")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let name = get_string(&args, 1)?;
                let value = get_string_or(&args, 2, "")?;
                let plugin_id = ctx.plugin_id()?;
                ctx.registry()?.set_variable(&plugin_id, &name, value);
                Ok(ApiCode::Ok.code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "DeleteVariable",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "DeleteVariable")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let name = get_string(&args, 1)?;
                let plugin_id = ctx.plugin_id()?;
                Ok(if ctx.registry()?.delete_variable(&plugin_id, &name) {
                    ApiCode::Ok.code()
                } else {
                    ApiCode::VariableNotFound.code()
                })
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetVariableList",
            lua.create_function(move |lua, ()| {
                let plugin_id = ctx.plugin_id()?;
                let registry = ctx.registry()?;
                let list = lua.create_table()?;
                for name in registry.variable_names(&plugin_id) {
                    if let Some(value) = registry.get_variable(&plugin_id, &name) {
                        list.set(name, value)?;
                    }
                }
                Ok(list)
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetPluginVariable",
            lua.create_function(move |lua, args: MultiValue| {
                expect_max_args(&args, 2, "GetPluginVariable")?;
                let target = get_string(&args, 1)?;
                let name = get_string(&args, 2)?;
                let target = if target.is_empty() {
                    ctx.plugin_id()?
                } else {
                    target
                };
                Ok(match ctx.registry()?.get_variable(&target, &name) {
                    Some(value) => Value::String(lua.create_string(&value)?),
                    None => Value::Nil,
                })
            })?,
        )?;
    }

    // --- identity ----------------------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "GetPluginID",
            lua.create_function(move |_, ()| ctx.plugin_id())?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetPluginName",
            lua.create_function(move |_, ()| Ok(ctx.plugin()?.name()))?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetPluginInfo",
            lua.create_function(move |lua, args: MultiValue| {
                expect_max_args(&args, 2, "GetPluginInfo")?;
                let id = get_string(&args, 1)?;
                let code = get_int(&args, 2)?;
                let Some(plugin) = ctx.registry()?.plugin_by_id(&id) else {
                    return Ok(Value::Nil);
                };
                Ok(match code {
                    1 => Value::String(lua.create_string(plugin.name())?),
                    6 => Value::String(
                        lua.create_string(plugin.path().to_string_lossy().as_bytes())?,
                    ),
                    7 => Value::String(lua.create_string(plugin.id())?),
                    16 => Value::Boolean(plugin.enabled()),
                    22 => Value::String(
                        lua.create_string(plugin.installed().to_rfc3339())?,
                    ),
                    _ => Value::Nil,
                })
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetPluginList",
            lua.create_function(move |lua, ()| {
                let registry = ctx.registry()?;
                let ids: Vec<String> = (0..registry.len())
                    .filter_map(|index| registry.plugin_at(index))
                    .map(|plugin| plugin.id())
                    .collect();
                lua.create_sequence_from(ids)
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "IsPluginInstalled",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "IsPluginInstalled")?;
                let id = get_string(&args, 1)?;
                Ok(ctx.registry()?.plugin_by_id(&id).is_some())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "EnablePlugin",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "EnablePlugin")?;
                let id = get_string(&args, 1)?;
                let enabled = crate::marshal::get_bool_or(&args, 2, true)?;
                Ok(ctx.registry()?.enable_plugin(&id, enabled).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "PluginSupports",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "PluginSupports")?;
                let id = get_string(&args, 1)?;
                let routine = get_string(&args, 2)?;
                Ok(match ctx.registry()?.plugin_by_id(&id) {
                    None => ApiCode::NoSuchPlugin.code(),
                    Some(plugin) if plugin.has_function(&routine) => ApiCode::Ok.code(),
                    Some(_) => ApiCode::NoSuchRoutine.code(),
                })
            })?,
        )?;
    }

    // --- broadcast and call ------------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "BroadcastPlugin",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "BroadcastPlugin")?;
                if !ctx.enabled() {
                    return Ok(0);
                }
                let message = get_int(&args, 1)?;
                let text = get_string_or(&args, 2, "")?;
                Ok(ctx.registry()?.broadcast(ctx.index, message, &text) as i64)
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "CallPlugin",
            lua.create_function(move |lua, args: MultiValue| {
                let id = get_string(&args, 1)?;
                let routine = get_string(&args, 2)?;
                let call_args: Vec<Value> = args.iter().skip(2).cloned().collect();
                let call_args = match values_from_lua(&call_args) {
                    Ok(values) => values,
                    Err((position, type_name)) => {
                        return pair(
                            lua,
                            ApiCode::BadParameter,
                            &format!(
                                "Cannot pass argument #{} ({type_name} type) to CallPlugin",
                                position + 2
                            ),
                        )
                    }
                };
                match ctx.registry()?.call_plugin(&id, &routine, &call_args) {
                    CallPluginResult::Ok(results) => {
                        let mut values = MultiValue::new();
                        values.push_back(Value::Integer(i64::from(ApiCode::Ok.code())));
                        for result in &results {
                            values.push_back(result.into_lua(lua)?);
                        }
                        Ok(values)
                    }
                    CallPluginResult::Failure { code, reason } => pair(lua, code, &reason),
                    CallPluginResult::ScriptError { reason, error } => {
                        let mut values = MultiValue::new();
                        values.push_back(Value::Integer(i64::from(
                            ApiCode::ErrorCallingPluginRoutine.code(),
                        )));
                        values.push_back(Value::String(lua.create_string(&reason)?));
                        values.push_back(Value::String(lua.create_string(&error)?));
                        Ok(values)
                    }
                }
            })?,
        )?;
    }

    Ok(())
}

fn pair(lua: &Lua, code: ApiCode, reason: &str) -> LuaResult<MultiValue> {
    let mut values = MultiValue::new();
    values.push_back(Value::Integer(i64::from(code.code())));
    values.push_back(Value::String(lua.create_string(reason)?));
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::super::tests::api_fixture;
    use super::*;
    use crate::plugin::PluginPack;

    #[test]
    fn test_variable_round_trip() {
        let (_host, _registry, plugin) = api_fixture();
        plugin.run_script(
            "SetVariable('hp', '100')\n\
             hp = GetVariable('hp')\n\
             missing = GetVariable('mp')\n\
             deleted = DeleteVariable('hp')\n\
             again = DeleteVariable('hp')",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<String>("hp").unwrap(), "100");
        assert!(lua.globals().get::<Value>("missing").unwrap().is_nil());
        assert_eq!(lua.globals().get::<i64>("deleted").unwrap(), 0);
        assert_eq!(
            lua.globals().get::<i64>("again").unwrap(),
            i64::from(ApiCode::VariableNotFound.code())
        );
    }

    #[test]
    fn test_variables_are_per_plugin() {
        let (_host, registry, plugin) = api_fixture();
        let other = registry
            .install(&PluginPack {
                id: "beefbeefbeefbeefbeefbeef".to_owned(),
                name: "other".to_owned(),
                script: "SetVariable('shared', 'theirs')".to_owned(),
                ..PluginPack::default()
            })
            .unwrap();
        plugin.run_script(
            "SetVariable('shared', 'mine')\n\
             mine = GetVariable('shared')\n\
             theirs = GetPluginVariable('beefbeefbeefbeefbeefbeef', 'shared')",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<String>("mine").unwrap(), "mine");
        assert_eq!(lua.globals().get::<String>("theirs").unwrap(), "theirs");
        drop(other);
    }

    #[test]
    fn test_identity_and_list() {
        let (_host, _registry, plugin) = api_fixture();
        plugin.run_script(
            "id = GetPluginID(); name = GetPluginName(); list = GetPluginList()\n\
             installed = IsPluginInstalled(id)\n\
             absent = IsPluginInstalled('000000000000000000000000')",
        );
        let lua = plugin.lua();
        assert_eq!(
            lua.globals().get::<String>("id").unwrap(),
            "feedfacefeedfacefeedface"
        );
        assert_eq!(lua.globals().get::<String>("name").unwrap(), "api-test");
        let list: Vec<String> = lua.globals().get("list").unwrap();
        assert_eq!(list, vec!["feedfacefeedfacefeedface".to_owned()]);
        assert!(lua.globals().get::<bool>("installed").unwrap());
        assert!(!lua.globals().get::<bool>("absent").unwrap());
    }

    #[test]
    fn test_plugin_supports() {
        let (_host, registry, plugin) = api_fixture();
        registry
            .install(&PluginPack {
                id: "beefbeefbeefbeefbeefbeef".to_owned(),
                name: "other".to_owned(),
                script: "function Exported() end".to_owned(),
                ..PluginPack::default()
            })
            .unwrap();
        plugin.run_script(
            "yes = PluginSupports('beefbeefbeefbeefbeefbeef', 'Exported')\n\
             no = PluginSupports('beefbeefbeefbeefbeefbeef', 'Missing')\n\
             gone = PluginSupports('000000000000000000000000', 'Exported')",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<i64>("yes").unwrap(), 0);
        assert_eq!(
            lua.globals().get::<i64>("no").unwrap(),
            i64::from(ApiCode::NoSuchRoutine.code())
        );
        assert_eq!(
            lua.globals().get::<i64>("gone").unwrap(),
            i64::from(ApiCode::NoSuchPlugin.code())
        );
    }

    #[test]
    fn test_call_plugin_from_script() {
        let (_host, registry, plugin) = api_fixture();
        registry
            .install(&PluginPack {
                id: "beefbeefbeefbeefbeefbeef".to_owned(),
                name: "callee".to_owned(),
                script: "function Add(a, b) return a + b end".to_owned(),
                ..PluginPack::default()
            })
            .unwrap();
        plugin.run_script(
            "code, sum = CallPlugin('beefbeefbeefbeefbeefbeef', 'Add', 2, 3)\n\
             bad_code, reason = CallPlugin('beefbeefbeefbeefbeefbeef', 'Add', {})",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<i64>("code").unwrap(), 0);
        assert_eq!(lua.globals().get::<i64>("sum").unwrap(), 5);
        assert_eq!(
            lua.globals().get::<i64>("bad_code").unwrap(),
            i64::from(ApiCode::BadParameter.code())
        );
        let reason: String = lua.globals().get("reason").unwrap();
        assert_eq!(reason, "Cannot pass argument #3 (table type) to CallPlugin");
    }

    #[test]
    fn test_call_plugin_can_reenter_api() {
        let (host, registry, plugin) = api_fixture();
        registry
            .install(&PluginPack {
                id: "beefbeefbeefbeefbeefbeef".to_owned(),
                name: "noisy".to_owned(),
                script: "function Shout(text) Note('shouting ' .. text) return true end"
                    .to_owned(),
                ..PluginPack::default()
            })
            .unwrap();
        plugin.run_script(
            "code, ok = CallPlugin('beefbeefbeefbeefbeefbeef', 'Shout', 'loud')",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<i64>("code").unwrap(), 0);
        assert!(lua.globals().get::<bool>("ok").unwrap());
        assert_eq!(host.borrow().notes, vec!["shouting loud"]);
    }

    #[test]
    fn test_enable_plugin_from_script() {
        let (_host, registry, plugin) = api_fixture();
        registry
            .install(&PluginPack {
                id: "beefbeefbeefbeefbeefbeef".to_owned(),
                name: "victim".to_owned(),
                ..PluginPack::default()
            })
            .unwrap();
        plugin.run_script(
            "a = EnablePlugin('beefbeefbeefbeefbeefbeef', false)\n\
             state = GetPluginInfo('beefbeefbeefbeefbeefbeef', 16)",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<i64>("a").unwrap(), 0);
        assert!(!lua.globals().get::<bool>("state").unwrap());
    }
}
