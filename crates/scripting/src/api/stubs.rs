//! The legacy no-op surface: functions old plugins call freely but which
//! have no effect here (MDI chrome, notepads, the mapper, spell checking).
//! Each accepts any arguments and returns its family's fixed value, so
//! scripts written against the original client keep running unmodified.

use mlua::{Lua, MultiValue, Result as LuaResult, Table, Value};
use mudlark_core::ApiCode;

use super::ApiContext;

/// Return OK (0).
const NOOP_OK: &[&str] = &[
    "Accelerator",
    "AcceleratorTo",
    "ActivateNotepad",
    "AddMapperComment",
    "AddToMapper",
    "AppendToNotepad",
    "CloseLog",
    "CloseNotepad",
    "DeleteAllMapItems",
    "DeleteLastMapItem",
    "DiscardQueue",
    "DoCommand",
    "FlashIcon",
    "FlushLog",
    "GetCustomColourBackground",
    "MapColour",
    "MoveMainWindow",
    "NotepadColour",
    "NotepadFont",
    "NotepadReadOnly",
    "NotepadSaveMethod",
    "OpenLog",
    "ReplaceNotepad",
    "SaveNotepad",
    "SendToNotepad",
    "SetBackgroundColour",
    "SetBackgroundImage",
    "SetCommandSelection",
    "SetCommandWindowHeight",
    "SetCustomColourName",
    "SetForegroundImage",
    "SetScroll",
    "SetToolBarPosition",
    "SetWorldWindowStatus",
    "TextRectangle",
    "WindowBezier",
    "WriteLog",
];

/// Return nothing.
const NOOP_VOID: &[&str] = &[
    "Activate",
    "ActivateClient",
    "Bookmark",
    "MtSrand",
    "Redraw",
    "Repaint",
    "ResetIP",
    "ResetStatusTime",
    "ResetTimers",
    "SetCustomColourBackground",
    "SetCustomColourText",
    "SetFrameBackgroundColour",
    "SetNoteColour",
];

/// Return nil.
const NOOP_NIL: &[&str] = &[
    "Debug",
    "GetHostAddress",
    "GetHostName",
    "GetNotepadWindowPosition",
];

/// Return false.
const NOOP_FALSE: &[&str] = &["IsLogOpen", "Mapping", "MoveNotepadWindow", "Transparency"];

/// Return -1.
const NOOP_NEG: &[&str] = &[
    "GetCommandSelection",
    "GetNoteColour",
    "GetNotepadLength",
    "MtRand",
];

/// Return an empty table.
const NOOP_EMPTY_TABLE: &[&str] = &[
    "AcceleratorList",
    "GetAcceleratorList",
    "GetMapColourList",
    "GetNotepadList",
    "GetQueue",
];

/// Return an empty string.
const NOOP_EMPTY_STRING: &[&str] = &[
    "GetCustomColourName",
    "GetNotepadText",
    "GetRecentLines",
    "GetWorldWindowPosition",
];

/// Return the first argument unchanged.
const NOOP_ECHO: &[&str] = &[
    "BlendPixel",
    "EvaluateSpeedwalk",
    "FilterPixel",
    "RemoveBacktracks",
    "ReverseSpeedwalk",
    "Trim",
];

/// Spell checking is permanently inactive.
const NOOP_SPELLCHECK: &[&str] = &["AddSpellCheckWord", "SpellCheck", "SpellCheckCommand"];

pub(super) fn register(lua: &Lua, globals: &Table, _ctx: &ApiContext) -> LuaResult<()> {
    for name in NOOP_OK {
        globals.set(
            *name,
            lua.create_function(|_, _: MultiValue| Ok(ApiCode::Ok.code()))?,
        )?;
    }
    for name in NOOP_VOID {
        globals.set(*name, lua.create_function(|_, _: MultiValue| Ok(()))?)?;
    }
    for name in NOOP_NIL {
        globals.set(
            *name,
            lua.create_function(|_, _: MultiValue| Ok(Value::Nil))?,
        )?;
    }
    for name in NOOP_FALSE {
        globals.set(*name, lua.create_function(|_, _: MultiValue| Ok(false))?)?;
    }
    for name in NOOP_NEG {
        globals.set(*name, lua.create_function(|_, _: MultiValue| Ok(-1))?)?;
    }
    for name in NOOP_EMPTY_TABLE {
        globals.set(
            *name,
            lua.create_function(|lua, _: MultiValue| lua.create_table())?,
        )?;
    }
    for name in NOOP_EMPTY_STRING {
        globals.set(
            *name,
            lua.create_function(|_, _: MultiValue| Ok(String::new()))?,
        )?;
    }
    for name in NOOP_ECHO {
        globals.set(
            *name,
            lua.create_function(|_, mut args: MultiValue| {
                Ok(args.pop_front().unwrap_or(Value::Nil))
            })?,
        )?;
    }
    for name in NOOP_SPELLCHECK {
        globals.set(
            *name,
            lua.create_function(|_, _: MultiValue| Ok(ApiCode::SpellCheckNotActive.code()))?,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::api_fixture;
    use super::*;

    #[test]
    fn test_stub_families_return_fixed_values() {
        let (_host, _registry, plugin) = api_fixture();
        plugin.run_script(
            "ok = DoCommand('look')\n\
             nothing = GetHostAddress()\n\
             neg = GetNotepadLength('pad')\n\
             empty = GetQueue()\n\
             blank = GetRecentLines(10)\n\
             echoed = EvaluateSpeedwalk('4n 3e')\n\
             spell = SpellCheck('teh')",
        );
        let lua = plugin.lua();
        assert_eq!(lua.globals().get::<i64>("ok").unwrap(), 0);
        assert!(lua.globals().get::<Value>("nothing").unwrap().is_nil());
        assert_eq!(lua.globals().get::<i64>("neg").unwrap(), -1);
        assert_eq!(
            lua.globals().get::<Table>("empty").unwrap().len().unwrap(),
            0
        );
        assert_eq!(lua.globals().get::<String>("blank").unwrap(), "");
        assert_eq!(lua.globals().get::<String>("echoed").unwrap(), "4n 3e");
        assert_eq!(
            lua.globals().get::<i64>("spell").unwrap(),
            i64::from(ApiCode::SpellCheckNotActive.code())
        );
    }

    #[test]
    fn test_stubs_ignore_any_arguments() {
        let (_host, _registry, plugin) = api_fixture();
        assert!(plugin
            .run_script("Repaint({}, function() end, 'extra', 1, 2, 3)")
            .is_ok());
    }
}
