//! The script-facing API surface: the legacy global-function families
//! registered into each plugin's interpreter.
//!
//! Each function is a closure over an [`ApiContext`]. Calls validate
//! their argument count and types up front (type errors surface as Lua
//! argument errors inside the caller's protected call), then delegate to
//! the [`Host`] or the registry, returning either an ApiCode integer, a
//! `(code, reason)` pair, or a domain value.

mod info;
mod output;
mod plugins;
mod senders;
mod stubs;
mod window;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use mlua::{Error as LuaError, Lua, MultiValue, Result as LuaResult};

use crate::host::Host;
use crate::marshal::concat_strings;
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;

/// What every API closure captures: the host, a weak back-pointer to the
/// registry (weak, or plugins would keep their own registry alive), and
/// the owning plugin's ordinal index.
#[derive(Clone)]
pub struct ApiContext {
    pub host: Rc<RefCell<dyn Host>>,
    pub registry: Weak<PluginRegistry>,
    pub index: usize,
}

impl ApiContext {
    pub(crate) fn registry(&self) -> LuaResult<Rc<PluginRegistry>> {
        self.registry
            .upgrade()
            .ok_or_else(|| LuaError::RuntimeError("world is closed".to_owned()))
    }

    pub(crate) fn plugin(&self) -> LuaResult<Rc<Plugin>> {
        self.registry()?
            .plugin_at(self.index)
            .ok_or_else(|| LuaError::RuntimeError("plugin is not installed".to_owned()))
    }

    pub(crate) fn plugin_id(&self) -> LuaResult<String> {
        Ok(self.plugin()?.id())
    }

    /// False once the owning plugin is disabled; a disabled plugin's
    /// leftover coroutines get PluginDisabled from every code-returning
    /// call instead of reaching the host.
    pub(crate) fn enabled(&self) -> bool {
        match self.registry.upgrade().and_then(|r| r.plugin_at(self.index)) {
            Some(plugin) => plugin.enabled(),
            None => false,
        }
    }
}

/// Register the full API surface plus the `print` override and the legacy
/// `world` alias table.
pub fn register_api(lua: &Lua, ctx: &ApiContext) -> LuaResult<()> {
    let globals = lua.globals();
    output::register(lua, &globals, ctx)?;
    senders::register(lua, &globals, ctx)?;
    info::register(lua, &globals, ctx)?;
    plugins::register(lua, &globals, ctx)?;
    window::register(lua, &globals, ctx)?;
    stubs::register(lua, &globals, ctx)?;

    // print writes to the world output, not stdout
    let print_ctx = ctx.clone();
    globals.set(
        "print",
        lua.create_function(move |_, args: MultiValue| {
            print_ctx
                .host
                .borrow_mut()
                .print_note(&concat_strings(&args), None, None);
            Ok(())
        })?,
    )?;

    // scripts written for the original client call world.Note(...) etc.
    globals.set("world", globals.clone())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::tests_support::RecordingHost;
    use crate::plugin::PluginPack;

    pub(crate) fn api_fixture() -> (Rc<RefCell<RecordingHost>>, Rc<PluginRegistry>, Rc<Plugin>) {
        let host = Rc::new(RefCell::new(RecordingHost::default()));
        let registry = PluginRegistry::new(host.clone());
        let plugin = registry
            .install(&PluginPack {
                id: "feedfacefeedfacefeedface".to_owned(),
                name: "api-test".to_owned(),
                ..PluginPack::default()
            })
            .unwrap();
        (host, registry, plugin)
    }

    #[test]
    fn test_print_goes_to_output() {
        let (host, _registry, plugin) = api_fixture();
        assert!(plugin.run_script("print('hello', 42)").is_ok());
        assert_eq!(host.borrow().notes, vec!["hello42"]);
    }

    #[test]
    fn test_world_alias_reaches_api() {
        let (host, _registry, plugin) = api_fixture();
        assert!(plugin.run_script("world.Note('from world table')").is_ok());
        assert_eq!(host.borrow().notes, vec!["from world table"]);
    }
}
