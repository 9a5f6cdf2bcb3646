//! The installed-plugin collection and every host-facing dispatch entry
//! point. One registry per world connection.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::info;
use mlua::Result as LuaResult;
use mudlark_core::{ActionSource, ApiCode, CommandSource};

use crate::api::ApiContext;
use crate::callback::{CallbackEvent, CallbackInvocation};
use crate::filter::CallbackFilter;
use crate::host::Host;
use crate::marshal::ScriptValue;
use crate::plugin::{find_function, Plugin, PluginMetadata, PluginPack};
use crate::thread::{call_plugin_routine, CallPluginResult};

pub struct PluginRegistry {
    host: Rc<RefCell<dyn Host>>,
    plugins: RefCell<Vec<Rc<Plugin>>>,
    /// Per-plugin string variables, keyed by plugin id. Kept outside the
    /// interpreters so they survive `reset()`.
    variables: RefCell<HashMap<String, HashMap<String, String>>>,
    unique: Cell<i64>,
    action_source: Cell<ActionSource>,
}

impl PluginRegistry {
    pub fn new(host: Rc<RefCell<dyn Host>>) -> Rc<Self> {
        Rc::new(PluginRegistry {
            host,
            plugins: RefCell::new(Vec::new()),
            variables: RefCell::new(HashMap::new()),
            unique: Cell::new(0),
            action_source: Cell::new(ActionSource::Unknown),
        })
    }

    pub fn host(&self) -> Rc<RefCell<dyn Host>> {
        self.host.clone()
    }

    /// Install one plugin at the end of the registration order. The
    /// returned plugin may be disabled if its script failed; the failure
    /// has already been reported through the host.
    pub fn install(self: &Rc<Self>, pack: &PluginPack) -> LuaResult<Rc<Plugin>> {
        let index = self.plugins.borrow().len();
        let metadata = PluginMetadata {
            id: pack.id.clone(),
            name: pack.name.clone(),
            index,
            installed: chrono::Utc::now(),
            path: pack.path.clone(),
        };
        let ctx = ApiContext {
            host: self.host.clone(),
            registry: Rc::downgrade(self),
            index,
        };
        let plugin = Rc::new(Plugin::new(metadata, ctx)?);
        self.plugins.borrow_mut().push(plugin.clone());
        if plugin.install(pack) {
            info!("installed plugin {:?} ({})", pack.name, pack.id);
            let mut invocation = CallbackInvocation::new(CallbackEvent::Install);
            plugin.run_callback(&mut invocation);
        }
        Ok(plugin)
    }

    /// Install a list of packs in order, then announce the list change.
    pub fn initialize_scripts(self: &Rc<Self>, packs: &[PluginPack]) -> LuaResult<Vec<Rc<Plugin>>> {
        let mut installed = Vec::with_capacity(packs.len());
        for pack in packs {
            installed.push(self.install(pack)?);
        }
        self.list_changed();
        Ok(installed)
    }

    pub fn len(&self) -> usize {
        self.plugins.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.borrow().is_empty()
    }

    pub fn plugin_at(&self, index: usize) -> Option<Rc<Plugin>> {
        self.plugins.borrow().get(index).cloned()
    }

    pub fn plugin_by_id(&self, id: &str) -> Option<Rc<Plugin>> {
        self.plugins.borrow().iter().find(|p| p.id() == id).cloned()
    }

    /// Registration-order snapshot. Dispatch iterates a snapshot so a
    /// callback that mutates the plugin list does not invalidate the walk.
    fn snapshot(&self) -> Vec<Rc<Plugin>> {
        self.plugins.borrow().clone()
    }

    pub fn enable_plugin(&self, id: &str, enabled: bool) -> ApiCode {
        match self.plugin_by_id(id) {
            Some(plugin) => {
                plugin.set_enabled(enabled);
                self.list_changed();
                ApiCode::Ok
            }
            None => ApiCode::NoSuchPlugin,
        }
    }

    /// The action source in effect for `GetInfo(239)`.
    pub fn action_source(&self) -> ActionSource {
        self.action_source.get()
    }

    pub fn next_unique_number(&self) -> i64 {
        let next = self.unique.get() + 1;
        self.unique.set(next);
        next
    }

    // --- variables ---------------------------------------------------

    pub fn get_variable(&self, plugin_id: &str, name: &str) -> Option<String> {
        self.variables
            .borrow()
            .get(plugin_id)
            .and_then(|vars| vars.get(name))
            .cloned()
    }

    pub fn set_variable(&self, plugin_id: &str, name: &str, value: String) {
        self.variables
            .borrow_mut()
            .entry(plugin_id.to_owned())
            .or_default()
            .insert(name.to_owned(), value);
    }

    pub fn delete_variable(&self, plugin_id: &str, name: &str) -> bool {
        self.variables
            .borrow_mut()
            .get_mut(plugin_id)
            .is_some_and(|vars| vars.remove(name).is_some())
    }

    pub fn variable_names(&self, plugin_id: &str) -> Vec<String> {
        self.variables
            .borrow()
            .get(plugin_id)
            .map(|vars| vars.keys().cloned().collect())
            .unwrap_or_default()
    }

    // --- dispatch ----------------------------------------------------

    /// Run one event through every enabled plugin in registration order.
    /// Returns false only when a discard-policy callback vetoed the event.
    pub fn dispatch(&self, invocation: &mut CallbackInvocation) -> bool {
        let previous = self.action_source.replace(invocation.event.source());
        for plugin in self.snapshot() {
            plugin.run_callback(invocation);
        }
        self.action_source.set(previous);
        invocation.outcome.processing()
    }

    /// Whether any enabled plugin defines a handler for the event, per the
    /// last filter scans. Lets the client skip building event payloads
    /// nobody will see.
    pub fn handles(&self, event: &CallbackEvent) -> bool {
        let mut combined = CallbackFilter::empty();
        for plugin in self.plugins.borrow().iter() {
            if plugin.enabled() {
                combined |= plugin.filter();
            }
        }
        combined.includes(event)
    }

    /// A command is about to be processed. False means a plugin consumed
    /// it and the client should drop it.
    pub fn command(&self, source: CommandSource, text: &[u8]) -> bool {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::Command {
            source,
            text,
        }))
    }

    /// The command was entered; plugins may rewrite it in place.
    pub fn command_entered(&self, source: CommandSource, text: &mut Vec<u8>) {
        let mut invocation =
            CallbackInvocation::with_buffer(CallbackEvent::CommandEntered { source }, text);
        self.dispatch(&mut invocation);
    }

    pub fn command_changed(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::CommandChanged));
    }

    pub fn tab_complete(&self, text: &mut Vec<u8>) {
        let mut invocation = CallbackInvocation::with_buffer(CallbackEvent::TabComplete, text);
        self.dispatch(&mut invocation);
    }

    /// A complete line arrived from the server. False suppresses it from
    /// the output buffer.
    pub fn line_received(&self, line: &str) -> bool {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::LineReceived {
            line,
        }))
    }

    /// Text is about to be sent to the server. False drops it.
    pub fn send_outgoing(&self, text: &[u8]) -> bool {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::Send { text }))
    }

    /// Text was sent (after any OnPluginSend veto round).
    pub fn sent(&self, text: &[u8]) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::Sent { text }));
    }

    pub fn telnet_request(&self, code: u8, message: &str) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::TelnetRequest {
            code,
            message,
        }));
    }

    /// The client agreed to a server WILL: plugins hear the acknowledgment
    /// before the notification, always in this order.
    pub fn telnet_do_supported(&self, code: u8) {
        self.telnet_request(code, "SENT_DO");
        self.telnet_request(code, "WILL");
    }

    pub fn telnet_subnegotiation(&self, code: u8, data: &[u8]) {
        self.dispatch(&mut CallbackInvocation::new(
            CallbackEvent::TelnetSubnegotiation { code, data },
        ));
    }

    pub fn iac_ga(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::IacGa));
    }

    pub fn connected(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::Connect));
    }

    pub fn disconnected(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::Disconnect));
    }

    pub fn get_focus(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::GetFocus));
    }

    pub fn lose_focus(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::LoseFocus));
    }

    pub fn world_save(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::WorldSave));
    }

    pub fn save_state(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::SaveState));
    }

    pub fn list_changed(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::ListChanged));
    }

    pub fn mxp_start(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::MxpStart));
    }

    pub fn mxp_stop(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::MxpStop));
    }

    pub fn mxp_set_entity(&self, value: &str) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::MxpSetEntity {
            value,
        }));
    }

    pub fn mxp_set_variable(&self, variable: &str, contents: &str) {
        self.dispatch(&mut CallbackInvocation::new(
            CallbackEvent::MxpSetVariable { variable, contents },
        ));
    }

    pub fn output_resized(&self) {
        self.dispatch(&mut CallbackInvocation::new(
            CallbackEvent::WorldOutputResized,
        ));
    }

    /// World shutting down; every plugin gets OnPluginClose.
    pub fn closing(&self) {
        self.dispatch(&mut CallbackInvocation::new(CallbackEvent::Close));
    }

    /// Dispatch to a single plugin by index; used for routines registered
    /// by that plugin (hotspot handlers, timer scripts).
    pub fn dispatch_to(&self, index: usize, invocation: &mut CallbackInvocation) -> bool {
        let Some(plugin) = self.plugin_at(index) else {
            return false;
        };
        let previous = self.action_source.replace(invocation.event.source());
        let fired = plugin.run_callback(invocation);
        self.action_source.set(previous);
        fired
    }

    /// A hotspot handler (mouse-over/down/up, scrollwheel) fired.
    pub fn hotspot_event(
        &self,
        plugin_index: usize,
        routine: &str,
        hotspot_id: &str,
        flags: i64,
    ) -> bool {
        if routine.is_empty() {
            return false;
        }
        self.dispatch_to(
            plugin_index,
            &mut CallbackInvocation::new(CallbackEvent::Hotspot {
                routine,
                hotspot_id,
                flags,
            }),
        )
    }

    /// A timer's send-to-script routine fired.
    pub fn timer_fired(&self, plugin_index: usize, routine: &str, label: &str) -> bool {
        self.dispatch_to(
            plugin_index,
            &mut CallbackInvocation::new(CallbackEvent::Timer { routine, label }),
        )
    }

    /// Capture a drag handler at mouse-down time. The client holds the
    /// result and fires it on every drag-move (and once on release); each
    /// fire is a no-op after the plugin is disabled or reset.
    pub fn prepare_drag(
        &self,
        plugin_index: usize,
        routine: &str,
        hotspot_id: &str,
        flags: i64,
    ) -> Option<crate::thread::PendingCallback> {
        if routine.is_empty() {
            return None;
        }
        let plugin = self.plugin_at(plugin_index)?;
        if !plugin.enabled() {
            return None;
        }
        crate::thread::PendingCallback::capture(
            &plugin,
            routine,
            vec![
                ScriptValue::Int(flags),
                ScriptValue::String(hotspot_id.as_bytes().to_vec()),
            ],
        )
    }

    /// BroadcastPlugin: every *other* enabled plugin hears the message on
    /// a child stack, in registration order. Returns how many actually
    /// handled it.
    pub fn broadcast(&self, sender_index: usize, message: i64, text: &str) -> usize {
        let Some(sender) = self.plugin_at(sender_index) else {
            return 0;
        };
        let sender_id = sender.id();
        let sender_name = sender.name();
        let mut heard = 0;
        for plugin in self.snapshot() {
            if plugin.index() == sender_index {
                continue;
            }
            let mut invocation = CallbackInvocation::new(CallbackEvent::Broadcast {
                message,
                plugin_id: &sender_id,
                plugin_name: &sender_name,
                text,
            });
            if plugin.run_callback_threaded(&mut invocation) {
                heard += 1;
            }
        }
        heard
    }

    /// CallPlugin: invoke a routine in another plugin (or the caller's
    /// own) with primitive-copied arguments. Reason strings match the
    /// legacy client word for word; scripts pattern-match on them.
    pub fn call_plugin(
        &self,
        plugin_id: &str,
        routine: &str,
        args: &[ScriptValue],
    ) -> CallPluginResult {
        let Some(target) = self.plugin_by_id(plugin_id) else {
            return CallPluginResult::Failure {
                code: ApiCode::NoSuchPlugin,
                reason: format!("Plugin ID ({plugin_id}) is not installed"),
            };
        };
        if !target.enabled() {
            return CallPluginResult::Failure {
                code: ApiCode::PluginDisabled,
                reason: format!(
                    "Plugin '{}' ({plugin_id}) is not enabled",
                    target.name()
                ),
            };
        }
        let lua = target.lua();
        let function = match find_function(&lua, routine) {
            Ok(Some(function)) => function,
            _ => {
                return CallPluginResult::Failure {
                    code: ApiCode::NoSuchRoutine,
                    reason: format!(
                        "No function '{routine}' in plugin '{}' ({plugin_id})",
                        target.name()
                    ),
                }
            }
        };
        call_plugin_routine(&target, routine, function, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::tests_support::RecordingHost;

    fn pack(id: &str, name: &str, script: &str) -> PluginPack {
        PluginPack {
            id: id.to_owned(),
            name: name.to_owned(),
            script: script.to_owned(),
            ..PluginPack::default()
        }
    }

    fn fixture() -> (Rc<RefCell<RecordingHost>>, Rc<PluginRegistry>) {
        let host = Rc::new(RefCell::new(RecordingHost::default()));
        let registry = PluginRegistry::new(host.clone());
        (host, registry)
    }

    #[test]
    fn test_connect_fires_exactly_once_per_plugin() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[
                pack("a", "first", "hits = 0; function OnPluginConnect() hits = hits + 1 end"),
                pack("b", "second", "hits = 0; function OnPluginConnect() hits = hits + 1 end"),
            ])
            .unwrap();
        registry.connected();
        for index in 0..2 {
            let plugin = registry.plugin_at(index).unwrap();
            let hits: i64 = plugin.lua().globals().get("hits").unwrap();
            assert_eq!(hits, 1, "plugin {index}");
        }
    }

    #[test]
    fn test_line_received_false_suppresses() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[
                pack("a", "quiet", "function OnPluginLineReceived(line) return line ~= 'secret' end"),
                pack("b", "noisy", "function OnPluginLineReceived(line) return true end"),
            ])
            .unwrap();
        assert!(registry.line_received("hello"));
        assert!(!registry.line_received("secret"));
        // a later true cannot undo an earlier false
        assert!(registry.line_received("hello"));
    }

    #[test]
    fn test_command_entered_chains_modifications_in_order() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[
                pack("a", "first", "function OnPluginCommandEntered(text) return text .. '-a' end"),
                pack("b", "second", "function OnPluginCommandEntered(text) return text .. '-b' end"),
            ])
            .unwrap();
        let mut text = b"go".to_vec();
        registry.command_entered(CommandSource::User, &mut text);
        assert_eq!(text, b"go-a-b");
    }

    #[test]
    fn test_disabled_plugin_skipped_by_dispatch() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[pack(
                "a",
                "veto",
                "function OnPluginSend(text) return false end",
            )])
            .unwrap();
        assert!(!registry.send_outgoing(b"north"));
        assert_eq!(registry.enable_plugin("a", false), ApiCode::Ok);
        assert!(registry.send_outgoing(b"north"));
        assert_eq!(registry.enable_plugin("missing", false), ApiCode::NoSuchPlugin);
    }

    #[test]
    fn test_broadcast_skips_sender() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[
                pack("a", "speaker", "function OnPluginBroadcast(msg, id, name, text) heard = text end"),
                pack("b", "listener", "function OnPluginBroadcast(msg, id, name, text) heard = name .. ':' .. text end"),
            ])
            .unwrap();
        registry.broadcast(0, 1, "ping");
        let speaker = registry.plugin_at(0).unwrap();
        let listener = registry.plugin_at(1).unwrap();
        assert!(speaker.lua().globals().get::<Option<String>>("heard").unwrap().is_none());
        assert_eq!(
            listener.lua().globals().get::<String>("heard").unwrap(),
            "speaker:ping"
        );
    }

    #[test]
    fn test_call_plugin_reasons_match_legacy_formats() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[pack("abc", "target", "function Hello(name) return 'hi ' .. name end")])
            .unwrap();
        match registry.call_plugin("nope", "Hello", &[]) {
            CallPluginResult::Failure { code, reason } => {
                assert_eq!(code, ApiCode::NoSuchPlugin);
                assert_eq!(reason, "Plugin ID (nope) is not installed");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match registry.call_plugin("abc", "Goodbye", &[]) {
            CallPluginResult::Failure { code, reason } => {
                assert_eq!(code, ApiCode::NoSuchRoutine);
                assert_eq!(reason, "No function 'Goodbye' in plugin 'target' (abc)");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match registry.call_plugin("abc", "Hello", &[ScriptValue::String(b"bob".to_vec())]) {
            CallPluginResult::Ok(values) => {
                assert_eq!(values, vec![ScriptValue::String(b"hi bob".to_vec())]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        registry.enable_plugin("abc", false);
        assert_eq!(
            registry.call_plugin("abc", "Hello", &[]).code(),
            ApiCode::PluginDisabled
        );
    }

    #[test]
    fn test_variables_survive_reset() {
        let (_host, registry) = fixture();
        let plugin = registry.install(&pack("abc", "vars", "")).unwrap();
        registry.set_variable("abc", "hp", "100".to_owned());
        plugin.reset().unwrap();
        assert_eq!(registry.get_variable("abc", "hp").as_deref(), Some("100"));
        assert!(registry.delete_variable("abc", "hp"));
        assert!(!registry.delete_variable("abc", "hp"));
        assert!(registry.get_variable("abc", "hp").is_none());
    }

    #[test]
    fn test_action_source_restored_after_dispatch() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[pack("a", "probe", "function OnPluginConnect() end")])
            .unwrap();
        assert_eq!(registry.action_source(), ActionSource::Unknown);
        registry.connected();
        assert_eq!(registry.action_source(), ActionSource::Unknown);
    }

    #[test]
    fn test_unique_numbers_increment() {
        let (_host, registry) = fixture();
        assert_eq!(registry.next_unique_number(), 1);
        assert_eq!(registry.next_unique_number(), 2);
    }

    #[test]
    fn test_hotspot_and_timer_routines_dispatch_to_one_plugin() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[
                pack("a", "owner", "function OnDown(flags, id) clicked = id end\n\
                      timers = { tick = function(label) ticked = label end }"),
                pack("b", "bystander", "function OnDown() clicked = 'wrong plugin' end"),
            ])
            .unwrap();
        assert!(registry.hotspot_event(0, "OnDown", "hs1", 16));
        assert!(registry.timer_fired(0, "timers.tick", "heartbeat"));
        assert!(!registry.hotspot_event(0, "", "hs1", 0));
        assert!(!registry.hotspot_event(0, "NoSuchRoutine", "hs1", 0));
        let owner = registry.plugin_at(0).unwrap();
        let bystander = registry.plugin_at(1).unwrap();
        assert_eq!(
            owner.lua().globals().get::<String>("clicked").unwrap(),
            "hs1"
        );
        assert_eq!(
            owner.lua().globals().get::<String>("ticked").unwrap(),
            "heartbeat"
        );
        assert!(bystander
            .lua()
            .globals()
            .get::<Option<String>>("clicked")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_prepare_drag_requires_routine_and_enabled_plugin() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[pack("a", "drag", "function OnMove(flags, id) end")])
            .unwrap();
        assert!(registry.prepare_drag(0, "OnMove", "hs1", 0).is_some());
        assert!(registry.prepare_drag(0, "", "hs1", 0).is_none());
        assert!(registry.prepare_drag(0, "Missing", "hs1", 0).is_none());
        registry.enable_plugin("a", false);
        assert!(registry.prepare_drag(0, "OnMove", "hs1", 0).is_none());
    }

    #[test]
    fn test_install_fires_oninstall_and_failure_disables() {
        let (host, registry) = fixture();
        let good = registry
            .install(&pack("a", "good", "function OnPluginInstall() installed = true end"))
            .unwrap();
        assert!(good.lua().globals().get::<bool>("installed").unwrap());
        let bad = registry.install(&pack("b", "bad", "this is not lua")).unwrap();
        assert!(!bad.enabled());
        assert!(host.borrow().errors[0].starts_with("Compile error:"));
    }

    #[test]
    fn test_handles_unions_enabled_plugin_filters() {
        let (_host, registry) = fixture();
        registry
            .initialize_scripts(&[
                pack("a", "watcher", "function OnPluginConnect() end"),
                pack("b", "empty", ""),
            ])
            .unwrap();
        assert!(registry.handles(&CallbackEvent::Connect));
        assert!(!registry.handles(&CallbackEvent::GetFocus));
        registry.enable_plugin("a", false);
        assert!(!registry.handles(&CallbackEvent::Connect));
    }
}
