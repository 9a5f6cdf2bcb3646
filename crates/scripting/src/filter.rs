//! Callback filter: a bitmask recording which named callbacks a plugin's
//! globals actually define, so dispatch can skip the Lua boundary entirely
//! for plugins that do not handle an event.

use mlua::{Lua, Result as LuaResult, Value};

use crate::callback::{CallbackEvent, NAMED_CALLBACKS};

/// One bit per named callback, in [`NAMED_CALLBACKS`] order. Dynamic
/// (dotted) routines are never represented here; they are resolved at
/// dispatch time instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallbackFilter(u32);

impl CallbackFilter {
    pub const fn empty() -> Self {
        CallbackFilter(0)
    }

    /// Rebuild from the interpreter's current globals. A bit is set iff a
    /// global *function* with the callback's name exists; anything else
    /// bound to the name (string, table) does not count.
    pub fn scan(lua: &Lua) -> LuaResult<Self> {
        let globals = lua.globals();
        let mut bits = 0u32;
        for (index, name) in NAMED_CALLBACKS.iter().enumerate() {
            if matches!(globals.raw_get::<Value>(*name)?, Value::Function(_)) {
                bits |= 1 << index;
            }
        }
        Ok(CallbackFilter(bits))
    }

    /// Whether this plugin handles the event. Dynamic routines always
    /// pass; they bypass the filter by construction.
    pub fn includes(&self, event: &CallbackEvent) -> bool {
        match event.bit() {
            Some(bit) => self.0 & bit != 0,
            None => true,
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl std::ops::BitOrAssign for CallbackFilter {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
