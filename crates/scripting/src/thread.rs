//! Child execution contexts: deferred callbacks fired by the client long
//! after the registering dispatch returned, and cross-plugin routine
//! invocation. Both run on an ephemeral `mlua::Thread` so they cannot
//! perturb whatever call stack happens to be live when they run.

use std::rc::{Rc, Weak};

use mlua::{Function, MultiValue, Thread};
use mudlark_core::ApiCode;

use crate::error::{check_fatal, format_lua_error, format_runtime_error};
use crate::marshal::{values_into_lua, ScriptValue};
use crate::plugin::{find_function, Plugin};

/// A callback captured now, fired later (hotspot drag-move/release).
///
/// The routine is resolved at capture time; the arguments are owned
/// primitive copies, so firing needs nothing from the original dispatch.
/// Firing is a no-op returning false once the owning plugin has been
/// removed, disabled, or reset (the generation check).
pub struct PendingCallback {
    plugin: Weak<Plugin>,
    generation: u64,
    function: Function,
    args: Vec<ScriptValue>,
}

impl PendingCallback {
    /// Capture `routine` in the plugin's current interpreter. `None` if
    /// the routine does not resolve to a function.
    pub fn capture(plugin: &Rc<Plugin>, routine: &str, args: Vec<ScriptValue>) -> Option<Self> {
        let lua = plugin.lua();
        let function = match find_function(&lua, routine) {
            Ok(Some(function)) => function,
            Ok(None) => return None,
            Err(error) => {
                check_fatal(&error);
                return None;
            }
        };
        Some(PendingCallback {
            plugin: Rc::downgrade(plugin),
            generation: plugin.generation(),
            function,
            args,
        })
    }

    /// Run the captured routine on a fresh thread. Returns true iff it
    /// actually ran to completion; reusable (drag-move fires repeatedly).
    pub fn fire(&self) -> bool {
        let Some(plugin) = self.plugin.upgrade() else {
            return false;
        };
        if !plugin.enabled() || plugin.generation() != self.generation {
            return false;
        }
        let lua = plugin.lua();
        let run = || -> mlua::Result<()> {
            let args = values_into_lua(&lua, &self.args)?;
            let thread: Thread = lua.create_thread(self.function.clone())?;
            thread.resume::<()>(args)
        };
        match run() {
            Ok(()) => true,
            Err(error) => {
                check_fatal(&error);
                plugin.report_error(&format_runtime_error(&error));
                false
            }
        }
    }
}

/// Result of a cross-plugin routine invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CallPluginResult {
    /// Routine ran; primitive return values copied out.
    Ok(Vec<ScriptValue>),
    /// The call never reached the routine.
    Failure { code: ApiCode, reason: String },
    /// The routine raised; callers get the code, the reason, and the raw
    /// script error as a third value.
    ScriptError { reason: String, error: String },
}

impl CallPluginResult {
    pub fn code(&self) -> ApiCode {
        match self {
            CallPluginResult::Ok(_) => ApiCode::Ok,
            CallPluginResult::Failure { code, .. } => *code,
            CallPluginResult::ScriptError { .. } => ApiCode::ErrorCallingPluginRoutine,
        }
    }
}

/// Invoke `routine` inside `target`'s interpreter on a child thread,
/// copying arguments in and results out through [`ScriptValue`].
///
/// Precondition checks (plugin installed, enabled, routine present,
/// primitive arguments) belong to the caller; this only covers the
/// invocation itself and result copying.
pub fn call_plugin_routine(
    target: &Rc<Plugin>,
    routine: &str,
    function: Function,
    args: &[ScriptValue],
) -> CallPluginResult {
    let lua = target.lua();
    let invoke = || -> mlua::Result<MultiValue> {
        let args = values_into_lua(&lua, args)?;
        let thread = lua.create_thread(function)?;
        thread.resume::<MultiValue>(args)
    };
    let values = match invoke() {
        Ok(values) => values,
        Err(error) => {
            check_fatal(&error);
            return CallPluginResult::ScriptError {
                reason: format!(
                    "Runtime error in function '{routine}', plugin '{}' ({})",
                    target.name(),
                    target.id()
                ),
                error: format_lua_error(&error),
            };
        }
    };
    let mut results = Vec::with_capacity(values.len());
    for (position, value) in values.iter().enumerate() {
        match ScriptValue::from_lua(value) {
            Ok(value) => results.push(value),
            Err(type_name) => {
                return CallPluginResult::Failure {
                    code: ApiCode::ErrorCallingPluginRoutine,
                    reason: format!(
                        "Cannot handle return value #{} ({type_name} type) from function '{routine}' in plugin '{}' ({})",
                        position + 1,
                        target.name(),
                        target.id()
                    ),
                }
            }
        }
    }
    CallPluginResult::Ok(results)
}
