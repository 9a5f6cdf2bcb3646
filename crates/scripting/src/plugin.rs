//! A single installed plugin: its identity, its interpreter, and the
//! machinery for running scripts and callbacks inside it.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use mlua::{Function, Lua, MultiValue, Result as LuaResult, Table, Value};
use serde::{Deserialize, Serialize};

use crate::api::{register_api, ApiContext};
use crate::callback::CallbackInvocation;
use crate::error::{
    check_fatal, format_compile_error, format_runtime_error, ScriptOutcome,
};
use crate::filter::CallbackFilter;

/// Identity of an installed plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// 24-hex-digit unique id from the plugin header.
    pub id: String,
    pub name: String,
    /// Ordinal position in the registry; stable for the plugin's lifetime.
    pub index: usize,
    pub installed: DateTime<Utc>,
    pub path: PathBuf,
}

/// Everything needed to install a plugin: header fields plus the inline
/// script chunk extracted from its file.
#[derive(Debug, Clone, Default)]
pub struct PluginPack {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub script: String,
}

/// One plugin, one interpreter.
///
/// Interior mutability throughout: callbacks re-enter the registry (and
/// thereby other plugins, or this one) while a dispatch is on the stack,
/// so nothing here may hold a borrow across a script call. The `Lua`
/// handle is cloned out of its cell before every use.
pub struct Plugin {
    metadata: RefCell<PluginMetadata>,
    lua: RefCell<Lua>,
    ctx: ApiContext,
    disabled: Cell<bool>,
    filter: Cell<CallbackFilter>,
    /// Bumped on every reset; pending callbacks captured against an older
    /// generation refuse to fire.
    generation: Cell<u64>,
}

impl Plugin {
    pub fn new(metadata: PluginMetadata, ctx: ApiContext) -> LuaResult<Self> {
        let lua = Lua::new();
        register_api(&lua, &ctx)?;
        Ok(Plugin {
            metadata: RefCell::new(metadata),
            lua: RefCell::new(lua),
            ctx,
            disabled: Cell::new(false),
            filter: Cell::new(CallbackFilter::empty()),
            generation: Cell::new(0),
        })
    }

    pub fn id(&self) -> String {
        self.metadata.borrow().id.clone()
    }

    pub fn name(&self) -> String {
        self.metadata.borrow().name.clone()
    }

    pub fn index(&self) -> usize {
        self.metadata.borrow().index
    }

    pub fn installed(&self) -> DateTime<Utc> {
        self.metadata.borrow().installed
    }

    pub fn path(&self) -> PathBuf {
        self.metadata.borrow().path.clone()
    }

    pub fn enabled(&self) -> bool {
        !self.disabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.disabled.set(!enabled);
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn filter(&self) -> CallbackFilter {
        self.filter.get()
    }

    /// Clone of the interpreter handle. Safe to hold across script calls;
    /// mlua's `Lua` is a ref-counted handle, not the heap itself.
    pub fn lua(&self) -> Lua {
        self.lua.borrow().clone()
    }

    /// Tear down and recreate the interpreter. Clears the disabled flag
    /// and the callback filter; outstanding pending callbacks from the old
    /// interpreter are orphaned by the generation bump.
    pub fn reset(&self) -> LuaResult<()> {
        let lua = Lua::new();
        register_api(&lua, &self.ctx)?;
        *self.lua.borrow_mut() = lua;
        self.disabled.set(false);
        self.filter.set(CallbackFilter::empty());
        self.generation.set(self.generation.get() + 1);
        debug!("plugin {:?} reset", self.metadata.borrow().name);
        Ok(())
    }

    /// Install from a pack: inline chunk first, then the on-disk `.lua`
    /// file sharing the plugin file's base name (if present and readable).
    /// Any failure disables the plugin and returns false.
    pub fn install(&self, pack: &PluginPack) -> bool {
        {
            let mut metadata = self.metadata.borrow_mut();
            metadata.id = pack.id.clone();
            metadata.name = pack.name.clone();
            metadata.path = pack.path.clone();
            metadata.installed = Utc::now();
        }
        if !pack.script.is_empty() && !self.run_script(&pack.script).is_ok() {
            self.set_enabled(false);
            return false;
        }
        let script_path = pack.path.with_extension("lua");
        if script_path != pack.path {
            if let Ok(source) = fs::read_to_string(&script_path) {
                if !self.run_script(&source).is_ok() {
                    self.set_enabled(false);
                    return false;
                }
            }
        }
        self.rescan_filter();
        true
    }

    /// Compile and run a chunk. Errors go to the host's error channel and
    /// are recovered; only Lua memory exhaustion escapes (as a panic).
    pub fn run_script(&self, source: &str) -> ScriptOutcome {
        if self.disabled.get() || source.is_empty() {
            return ScriptOutcome::RuntimeError;
        }
        let lua = self.lua();
        let chunk_name = self.metadata.borrow().name.clone();
        let function = match lua.load(source).set_name(chunk_name.as_str()).into_function() {
            Ok(function) => function,
            Err(error) => {
                check_fatal(&error);
                self.report_error(&format_compile_error(&error));
                return ScriptOutcome::CompileError;
            }
        };
        if let Err(error) = function.call::<()>(()) {
            check_fatal(&error);
            self.report_error(&format_runtime_error(&error));
            return ScriptOutcome::RuntimeError;
        }
        self.rescan_filter();
        ScriptOutcome::Ok
    }

    /// Re-read which named callbacks the globals define.
    pub fn rescan_filter(&self) {
        let lua = self.lua();
        match CallbackFilter::scan(&lua) {
            Ok(filter) => self.filter.set(filter),
            Err(error) => {
                check_fatal(&error);
                warn!("callback filter scan failed: {error}");
            }
        }
    }

    /// Whether a routine (possibly dotted) resolves to a function.
    pub fn has_function(&self, routine: &str) -> bool {
        let lua = self.lua();
        matches!(find_function(&lua, routine), Ok(Some(_)))
    }

    /// Run a callback on the main stack. Returns true iff the routine was
    /// present and completed; a runtime error is reported and counts as
    /// not-fired, leaving the outcome untouched.
    pub fn run_callback(&self, invocation: &mut CallbackInvocation) -> bool {
        self.run_callback_inner(invocation, false)
    }

    /// Same contract on an ephemeral child stack, so a callback that
    /// re-enters dispatch does not perturb the primary one. Used for
    /// broadcasts and cross-plugin calls.
    pub fn run_callback_threaded(&self, invocation: &mut CallbackInvocation) -> bool {
        self.run_callback_inner(invocation, true)
    }

    fn run_callback_inner(&self, invocation: &mut CallbackInvocation, threaded: bool) -> bool {
        if self.disabled.get() || !self.filter.get().includes(&invocation.event) {
            return false;
        }
        let lua = self.lua();
        let function = match find_function(&lua, invocation.event.name()) {
            Ok(Some(function)) => function,
            Ok(None) => return false,
            Err(error) => {
                check_fatal(&error);
                self.report_error(&format_runtime_error(&error));
                return false;
            }
        };
        let args = match invocation.push_arguments(&lua) {
            Ok(args) => args,
            Err(error) => {
                check_fatal(&error);
                self.report_error(&format_runtime_error(&error));
                return false;
            }
        };
        let result = if threaded {
            lua.create_thread(function)
                .and_then(|thread| thread.resume::<MultiValue>(args))
        } else {
            function.call::<MultiValue>(args)
        };
        match result {
            Ok(values) => {
                invocation.outcome.collect(&values);
                true
            }
            Err(error) => {
                check_fatal(&error);
                self.report_error(&format_runtime_error(&error));
                false
            }
        }
    }

    pub(crate) fn report_error(&self, message: &str) {
        self.ctx.host.borrow_mut().print_error(message);
    }
}

/// Resolve a routine name in the interpreter's globals. A dotted name is
/// split at the first `.`: the global must be a table and the remainder
/// must name a function in it, otherwise the routine resolves to `None`.
pub fn find_function(lua: &Lua, routine: &str) -> LuaResult<Option<Function>> {
    let globals = lua.globals();
    let (table, key): (Table, &str) = match routine.split_once('.') {
        None => (globals, routine),
        Some((name, property)) => match globals.raw_get::<Value>(name)? {
            Value::Table(table) => (table, property),
            _ => return Ok(None),
        },
    };
    Ok(match table.raw_get::<Value>(key)? {
        Value::Function(function) => Some(function),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CallbackEvent;
    use crate::registry::PluginRegistry;
    use std::rc::Rc;

    use crate::host::tests_support::RecordingHost;

    type Fixture = (Rc<RefCell<RecordingHost>>, Rc<PluginRegistry>, Rc<Plugin>);

    fn test_plugin() -> Fixture {
        let host = Rc::new(RefCell::new(RecordingHost::default()));
        let registry = PluginRegistry::new(host.clone());
        let plugin = registry
            .install(&PluginPack {
                id: "0123456789abcdef01234567".to_owned(),
                name: "test".to_owned(),
                ..PluginPack::default()
            })
            .unwrap();
        (host, registry, plugin)
    }

    #[test]
    fn test_find_function_dotted() {
        let lua = Lua::new();
        lua.load("mod = { sub = { fn = function() end } }; top = function() end")
            .exec()
            .unwrap();
        assert!(find_function(&lua, "top").unwrap().is_some());
        assert!(find_function(&lua, "mod.sub.fn").unwrap().is_some());
        assert!(find_function(&lua, "mod.sub").unwrap().is_none());
        assert!(find_function(&lua, "mod.missing").unwrap().is_none());
        assert!(find_function(&lua, "mod.sub.fn.deeper").unwrap().is_none());
    }

    #[test]
    fn test_run_script_updates_filter() {
        let (_host, _registry, plugin) = test_plugin();
        assert!(plugin.filter().is_empty());
        assert!(plugin
            .run_script("function OnPluginConnect() connected = true end")
            .is_ok());
        assert!(plugin.filter().includes(&CallbackEvent::Connect));
    }

    #[test]
    fn test_run_callback_fires_and_reports_absent() {
        let (_host, _registry, plugin) = test_plugin();
        plugin.run_script("count = 0; function OnPluginConnect() count = count + 1 end");
        let mut invocation = CallbackInvocation::new(CallbackEvent::Connect);
        assert!(plugin.run_callback(&mut invocation));
        assert!(plugin.run_callback(&mut invocation));
        let count: i64 = plugin.lua().globals().get("count").unwrap();
        assert_eq!(count, 2);
        let mut other = CallbackInvocation::new(CallbackEvent::Disconnect);
        assert!(!plugin.run_callback(&mut other));
    }

    #[test]
    fn test_disabled_plugin_refuses_dispatch() {
        let (_host, _registry, plugin) = test_plugin();
        plugin.run_script("function OnPluginConnect() error('should not run') end");
        plugin.set_enabled(false);
        let mut invocation = CallbackInvocation::new(CallbackEvent::Connect);
        assert!(!plugin.run_callback(&mut invocation));
        assert!(!plugin.run_script("x = 1").is_ok());
    }

    #[test]
    fn test_runtime_error_counts_as_not_fired() {
        let (host, _registry, plugin) = test_plugin();
        plugin.run_script("function OnPluginLineReceived(line) error('boom') return false end");
        let mut invocation =
            CallbackInvocation::new(CallbackEvent::LineReceived { line: "hello" });
        assert!(!plugin.run_callback(&mut invocation));
        // a failing discard callback does not discard
        assert!(invocation.outcome.processing());
        let errors = &host.borrow().errors;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Runtime error:"), "{}", errors[0]);
    }

    #[test]
    fn test_compile_error_reported() {
        let (host, _registry, plugin) = test_plugin();
        assert_eq!(
            plugin.run_script("function oops( end"),
            ScriptOutcome::CompileError
        );
        let errors = &host.borrow().errors;
        assert!(errors[0].starts_with("Compile error:"), "{}", errors[0]);
    }

    #[test]
    fn test_reset_clears_state_and_bumps_generation() {
        let (_host, _registry, plugin) = test_plugin();
        plugin.run_script("function OnPluginConnect() end");
        plugin.set_enabled(false);
        let generation = plugin.generation();
        plugin.reset().unwrap();
        assert!(plugin.enabled());
        assert!(plugin.filter().is_empty());
        assert_eq!(plugin.generation(), generation + 1);
        assert!(!plugin.has_function("OnPluginConnect"));
        // API is re-registered in the fresh interpreter
        assert!(plugin.run_script("Note('still works')").is_ok());
    }

    #[test]
    fn test_install_runs_sidecar_script_file() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_path = dir.path().join("mapper.xml");
        std::fs::write(dir.path().join("mapper.lua"), "from_file = true").unwrap();
        let host = Rc::new(RefCell::new(RecordingHost::default()));
        let registry = PluginRegistry::new(host.clone());
        let plugin = registry
            .install(&PluginPack {
                id: "0123456789abcdef01234567".to_owned(),
                name: "mapper".to_owned(),
                path: plugin_path,
                script: "inline = true".to_owned(),
            })
            .unwrap();
        let globals = plugin.lua().globals();
        assert!(globals.get::<bool>("inline").unwrap());
        assert!(globals.get::<bool>("from_file").unwrap());
    }

    #[test]
    fn test_install_failure_in_sidecar_disables() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_path = dir.path().join("broken.xml");
        std::fs::write(dir.path().join("broken.lua"), "not valid lua ((").unwrap();
        let host = Rc::new(RefCell::new(RecordingHost::default()));
        let registry = PluginRegistry::new(host.clone());
        let plugin = registry
            .install(&PluginPack {
                id: "0123456789abcdef01234567".to_owned(),
                name: "broken".to_owned(),
                path: plugin_path,
                ..PluginPack::default()
            })
            .unwrap();
        assert!(!plugin.enabled());
        assert!(host.borrow().errors[0].starts_with("Compile error:"));
    }

    #[test]
    fn test_metadata_serializes() {
        let metadata = PluginMetadata {
            id: "0123456789abcdef01234567".to_owned(),
            name: "mapper".to_owned(),
            index: 3,
            installed: Utc::now(),
            path: PathBuf::from("/plugins/mapper.xml"),
        };
        let json = serde_json::to_string(&metadata).unwrap();
        let back: PluginMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, metadata.id);
        assert_eq!(back.index, 3);
        assert_eq!(back.installed, metadata.installed);
    }

    #[test]
    fn test_threaded_callback_runs_on_child_stack() {
        let (_host, _registry, plugin) = test_plugin();
        plugin.run_script(
            "function OnPluginBroadcast(msg, id, name, text) received = text end",
        );
        let mut invocation = CallbackInvocation::new(CallbackEvent::Broadcast {
            message: 1,
            plugin_id: "abc",
            plugin_name: "other",
            text: "payload",
        });
        assert!(plugin.run_callback_threaded(&mut invocation));
        let received: String = plugin.lua().globals().get("received").unwrap();
        assert_eq!(received, "payload");
    }
}
