//! Callback descriptors: which script routine an event targets, what
//! arguments it receives, and how its return values are folded back into
//! the host's control flow.

use mlua::{Lua, MultiValue, Result as LuaResult, Value};
use mudlark_core::{ActionSource, CommandSource};

use crate::marshal::is_truthy;

/// A script-visible event. Named variants map onto the fixed callback
/// table below; the `Hotspot`, `Timer`, and `Routine` variants target a
/// routine by (possibly dotted) name and are resolved at dispatch time.
///
/// Payload is borrowed: the descriptor describes an event, it never owns
/// its data. Text that a callback may rewrite lives in the outcome
/// instead, see [`CallbackOutcome::Modify`].
#[derive(Debug, Clone, Copy)]
pub enum CallbackEvent<'a> {
    Broadcast {
        message: i64,
        plugin_id: &'a str,
        plugin_name: &'a str,
        text: &'a str,
    },
    Command {
        source: CommandSource,
        text: &'a [u8],
    },
    CommandChanged,
    Close,
    CommandEntered {
        source: CommandSource,
    },
    Connect,
    Disconnect,
    GetFocus,
    IacGa,
    Install,
    LineReceived {
        line: &'a str,
    },
    ListChanged,
    LoseFocus,
    MxpStart,
    MxpStop,
    MxpSetEntity {
        value: &'a str,
    },
    MxpSetVariable {
        variable: &'a str,
        contents: &'a str,
    },
    SaveState,
    Send {
        text: &'a [u8],
    },
    Sent {
        text: &'a [u8],
    },
    TabComplete,
    TelnetRequest {
        code: u8,
        message: &'a str,
    },
    TelnetSubnegotiation {
        code: u8,
        data: &'a [u8],
    },
    WorldSave,
    WorldOutputResized,

    /// Hotspot mouse/drag/scroll handler, by routine name.
    Hotspot {
        routine: &'a str,
        hotspot_id: &'a str,
        flags: i64,
    },
    /// Timer `send to script` routine, called with the timer's label.
    Timer {
        routine: &'a str,
        label: &'a str,
    },
    /// Bare routine call with no arguments (OnPluginSupports probes,
    /// alias/trigger script targets).
    Routine {
        routine: &'a str,
    },
}

/// Number of named callbacks; bits 0..NAMED_CALLBACK_COUNT of the filter.
pub const NAMED_CALLBACK_COUNT: usize = 25;

/// Names in bit order. The order is load-bearing: it defines the filter
/// bitmask layout persisted nowhere but relied upon by `bit()`.
pub const NAMED_CALLBACKS: [&str; NAMED_CALLBACK_COUNT] = [
    "OnPluginBroadcast",
    "OnPluginCommand",
    "OnPluginCommandChanged",
    "OnPluginClose",
    "OnPluginCommandEntered",
    "OnPluginConnect",
    "OnPluginDisconnect",
    "OnPluginGetFocus",
    "OnPlugin_IAC_GA",
    "OnPluginInstall",
    "OnPluginLineReceived",
    "OnPluginListChanged",
    "OnPluginLoseFocus",
    "OnPluginMXPstart",
    "OnPluginMXPstop",
    "OnPluginMXPsetEntity",
    "OnPluginMXPsetVariable",
    "OnPluginSaveState",
    "OnPluginSend",
    "OnPluginSent",
    "OnPluginTabComplete",
    "OnPluginTelnetRequest",
    "OnPluginTelnetSubnegotiation",
    "OnPluginWorldSave",
    "OnPluginWorldOutputResized",
];

impl<'a> CallbackEvent<'a> {
    /// Routine name to look up in the plugin's globals. Dotted for the
    /// dynamic variants when the stored routine contains a dot.
    pub fn name(&self) -> &str {
        use CallbackEvent::*;
        match self {
            Broadcast { .. } => NAMED_CALLBACKS[0],
            Command { .. } => NAMED_CALLBACKS[1],
            CommandChanged => NAMED_CALLBACKS[2],
            Close => NAMED_CALLBACKS[3],
            CommandEntered { .. } => NAMED_CALLBACKS[4],
            Connect => NAMED_CALLBACKS[5],
            Disconnect => NAMED_CALLBACKS[6],
            GetFocus => NAMED_CALLBACKS[7],
            IacGa => NAMED_CALLBACKS[8],
            Install => NAMED_CALLBACKS[9],
            LineReceived { .. } => NAMED_CALLBACKS[10],
            ListChanged => NAMED_CALLBACKS[11],
            LoseFocus => NAMED_CALLBACKS[12],
            MxpStart => NAMED_CALLBACKS[13],
            MxpStop => NAMED_CALLBACKS[14],
            MxpSetEntity { .. } => NAMED_CALLBACKS[15],
            MxpSetVariable { .. } => NAMED_CALLBACKS[16],
            SaveState => NAMED_CALLBACKS[17],
            Send { .. } => NAMED_CALLBACKS[18],
            Sent { .. } => NAMED_CALLBACKS[19],
            TabComplete => NAMED_CALLBACKS[20],
            TelnetRequest { .. } => NAMED_CALLBACKS[21],
            TelnetSubnegotiation { .. } => NAMED_CALLBACKS[22],
            WorldSave => NAMED_CALLBACKS[23],
            WorldOutputResized => NAMED_CALLBACKS[24],
            Hotspot { routine, .. } | Timer { routine, .. } | Routine { routine } => routine,
        }
    }

    /// Filter bit for named events; dynamic routines are never filtered.
    pub fn bit(&self) -> Option<u32> {
        use CallbackEvent::*;
        let index: u32 = match self {
            Broadcast { .. } => 0,
            Command { .. } => 1,
            CommandChanged => 2,
            Close => 3,
            CommandEntered { .. } => 4,
            Connect => 5,
            Disconnect => 6,
            GetFocus => 7,
            IacGa => 8,
            Install => 9,
            LineReceived { .. } => 10,
            ListChanged => 11,
            LoseFocus => 12,
            MxpStart => 13,
            MxpStop => 14,
            MxpSetEntity { .. } => 15,
            MxpSetVariable { .. } => 16,
            SaveState => 17,
            Send { .. } => 18,
            Sent { .. } => 19,
            TabComplete => 20,
            TelnetRequest { .. } => 21,
            TelnetSubnegotiation { .. } => 22,
            WorldSave => 23,
            WorldOutputResized => 24,
            Hotspot { .. } | Timer { .. } | Routine { .. } => return None,
        };
        Some(1 << index)
    }

    /// Action source in effect while this callback runs, answered through
    /// `GetInfo(239)`.
    pub fn source(&self) -> ActionSource {
        use CallbackEvent::*;
        match self {
            Command { source, .. } | CommandEntered { source } => source.action(),
            CommandChanged | TabComplete => ActionSource::UserTyping,
            LineReceived { .. } => ActionSource::InputFromServer,
            Connect | Disconnect | GetFocus | LoseFocus | MxpStart | MxpStop
            | MxpSetEntity { .. } | MxpSetVariable { .. } => ActionSource::WorldAction,
            Timer { .. } => ActionSource::TimerFired,
            Hotspot { .. } => ActionSource::Hotspot,
            _ => ActionSource::Unknown,
        }
    }

    /// Number of results requested from the protected call. Only events
    /// whose outcome inspects a return value ask for one.
    pub fn expected_results(&self) -> usize {
        use CallbackEvent::*;
        match self {
            Command { .. } | LineReceived { .. } | Send { .. } | CommandEntered { .. }
            | TabComplete => 1,
            _ => 0,
        }
    }

    /// Arguments in the documented order. `buffer` is the caller's
    /// modifiable text for `CommandEntered`/`TabComplete`, ignored by
    /// every other event.
    pub fn push_arguments(&self, lua: &Lua, buffer: Option<&[u8]>) -> LuaResult<MultiValue> {
        use CallbackEvent::*;
        let mut args = MultiValue::new();
        match self {
            Broadcast {
                message,
                plugin_id,
                plugin_name,
                text,
            } => {
                args.push_back(Value::Integer(*message));
                args.push_back(Value::String(lua.create_string(plugin_id)?));
                args.push_back(Value::String(lua.create_string(plugin_name)?));
                args.push_back(Value::String(lua.create_string(text)?));
            }
            Command { text, .. } | Send { text } | Sent { text } => {
                args.push_back(Value::String(lua.create_string(text)?));
            }
            CommandEntered { .. } | TabComplete => {
                let text = buffer.unwrap_or_default();
                args.push_back(Value::String(lua.create_string(text)?));
            }
            LineReceived { line } => {
                args.push_back(Value::String(lua.create_string(line)?));
            }
            MxpSetEntity { value } => {
                args.push_back(Value::String(lua.create_string(value)?));
            }
            MxpSetVariable {
                variable,
                contents,
            } => {
                args.push_back(Value::String(lua.create_string(variable)?));
                args.push_back(Value::String(lua.create_string(contents)?));
            }
            TelnetRequest { code, message } => {
                args.push_back(Value::Integer(i64::from(*code)));
                args.push_back(Value::String(lua.create_string(message)?));
            }
            TelnetSubnegotiation { code, data } => {
                args.push_back(Value::Integer(i64::from(*code)));
                args.push_back(Value::String(lua.create_string(data)?));
            }
            Hotspot {
                flags, hotspot_id, ..
            } => {
                args.push_back(Value::Integer(*flags));
                args.push_back(Value::String(lua.create_string(hotspot_id)?));
            }
            Timer { label, .. } => {
                args.push_back(Value::String(lua.create_string(label)?));
            }
            _ => (),
        }
        Ok(args)
    }
}

/// Where a callback's return value lands.
#[derive(Debug)]
pub enum CallbackOutcome<'a> {
    /// Return values are ignored.
    None,
    /// Event-permission aggregation. Starts `true`; an explicit non-nil
    /// falsey return from any plugin flips it to `false` for good.
    /// nil, absence, and truthy returns leave it alone.
    Discard(bool),
    /// A string (or number, via Lua's coercion) return replaces the
    /// buffer; nil or absence leaves it untouched.
    Modify(&'a mut Vec<u8>),
}

impl<'a> CallbackOutcome<'a> {
    pub fn for_event(event: &CallbackEvent, buffer: Option<&'a mut Vec<u8>>) -> Self {
        use CallbackEvent::*;
        match event {
            Command { .. } | LineReceived { .. } | Send { .. } => CallbackOutcome::Discard(true),
            CommandEntered { .. } | TabComplete => match buffer {
                Some(buffer) => CallbackOutcome::Modify(buffer),
                None => CallbackOutcome::None,
            },
            _ => CallbackOutcome::None,
        }
    }

    /// Fold one plugin's return values in.
    pub fn collect(&mut self, values: &MultiValue) {
        match self {
            CallbackOutcome::None => (),
            CallbackOutcome::Discard(processing) => {
                if let Some(value) = values.front() {
                    if !value.is_nil() && !is_truthy(value) {
                        *processing = false;
                    }
                }
            }
            CallbackOutcome::Modify(buffer) => match values.front() {
                Some(Value::String(s)) => **buffer = s.as_bytes().to_vec(),
                Some(Value::Integer(i)) => **buffer = i.to_string().into_bytes(),
                Some(Value::Number(n)) => **buffer = format!("{n}").into_bytes(),
                _ => (),
            },
        }
    }

    /// Result for the host: `false` only when a discard outcome was
    /// explicitly vetoed.
    pub fn processing(&self) -> bool {
        match self {
            CallbackOutcome::Discard(processing) => *processing,
            _ => true,
        }
    }
}

/// A dispatch in flight: the event plus the accumulating outcome.
#[derive(Debug)]
pub struct CallbackInvocation<'a, 'b> {
    pub event: CallbackEvent<'a>,
    pub outcome: CallbackOutcome<'b>,
}

impl<'a, 'b> CallbackInvocation<'a, 'b> {
    pub fn new(event: CallbackEvent<'a>) -> Self {
        let outcome = CallbackOutcome::for_event(&event, None);
        CallbackInvocation { event, outcome }
    }

    pub fn with_buffer(event: CallbackEvent<'a>, buffer: &'b mut Vec<u8>) -> Self {
        let outcome = CallbackOutcome::for_event(&event, Some(buffer));
        CallbackInvocation { event, outcome }
    }

    pub fn push_arguments(&self, lua: &Lua) -> LuaResult<MultiValue> {
        let buffer = match &self.outcome {
            CallbackOutcome::Modify(buffer) => Some(buffer.as_slice()),
            _ => None,
        };
        self.event.push_arguments(lua, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlua::Lua;

    #[test]
    fn test_names_match_bit_order() {
        assert_eq!(CallbackEvent::Broadcast {
            message: 0,
            plugin_id: "",
            plugin_name: "",
            text: "",
        }
        .bit(), Some(1));
        assert_eq!(CallbackEvent::WorldOutputResized.bit(), Some(1 << 24));
        assert_eq!(CallbackEvent::WorldOutputResized.name(), "OnPluginWorldOutputResized");
        assert_eq!(
            CallbackEvent::Routine { routine: "mod.fn" }.bit(),
            None
        );
    }

    #[test]
    fn test_discard_truth_table() {
        let lua = Lua::new();
        let cases: &[(&str, bool)] = &[
            ("return false", false),
            ("return nil", true),
            ("return", true),
            ("return true", true),
            ("return 0", true), // 0 is truthy in Lua
            ("return ''", true),
        ];
        for (code, expected) in cases {
            let mut outcome = CallbackOutcome::Discard(true);
            let values = lua.load(*code).eval::<MultiValue>().unwrap();
            outcome.collect(&values);
            assert_eq!(outcome.processing(), *expected, "{code}");
        }
    }

    #[test]
    fn test_discard_is_sticky() {
        let lua = Lua::new();
        let mut outcome = CallbackOutcome::Discard(true);
        outcome.collect(&lua.load("return false").eval::<MultiValue>().unwrap());
        outcome.collect(&lua.load("return true").eval::<MultiValue>().unwrap());
        assert!(!outcome.processing());
    }

    #[test]
    fn test_modify_replaces_on_string_keeps_on_nil() {
        let lua = Lua::new();
        let mut buffer = b"original".to_vec();
        {
            let mut outcome = CallbackOutcome::Modify(&mut buffer);
            outcome.collect(&lua.load("return 'changed'").eval::<MultiValue>().unwrap());
        }
        assert_eq!(buffer, b"changed");
        {
            let mut outcome = CallbackOutcome::Modify(&mut buffer);
            outcome.collect(&lua.load("return nil").eval::<MultiValue>().unwrap());
        }
        assert_eq!(buffer, b"changed");
        {
            let mut outcome = CallbackOutcome::Modify(&mut buffer);
            outcome.collect(&lua.load("return 42").eval::<MultiValue>().unwrap());
        }
        assert_eq!(buffer, b"42");
    }

    #[test]
    fn test_push_arguments_order() {
        let lua = Lua::new();
        let event = CallbackEvent::Broadcast {
            message: 7,
            plugin_id: "id",
            plugin_name: "name",
            text: "payload",
        };
        let args = event.push_arguments(&lua, None).unwrap();
        let args: Vec<Value> = args.into_iter().collect();
        assert_eq!(args.len(), 4);
        assert!(matches!(args[0], Value::Integer(7)));
        assert!(matches!(&args[3], Value::String(s) if s.to_string_lossy() == "payload"));
    }

    #[test]
    fn test_modify_event_reads_buffer() {
        let lua = Lua::new();
        let mut buffer = b"north".to_vec();
        let invocation = CallbackInvocation::with_buffer(
            CallbackEvent::CommandEntered {
                source: mudlark_core::CommandSource::User,
            },
            &mut buffer,
        );
        let args = invocation.push_arguments(&lua).unwrap();
        let args: Vec<Value> = args.into_iter().collect();
        assert!(matches!(&args[0], Value::String(s) if s.to_string_lossy() == "north"));
    }

    #[test]
    fn test_expected_results() {
        assert_eq!(CallbackEvent::Connect.expected_results(), 0);
        assert_eq!(
            CallbackEvent::LineReceived { line: "x" }.expected_results(),
            1
        );
        assert_eq!(CallbackEvent::TabComplete.expected_results(), 1);
    }

    #[test]
    fn test_sources() {
        use mudlark_core::CommandSource;
        assert_eq!(
            CallbackEvent::Command {
                source: CommandSource::User,
                text: b"n",
            }
            .source(),
            ActionSource::UserTyping
        );
        assert_eq!(
            CallbackEvent::Command {
                source: CommandSource::Hotkey,
                text: b"n",
            }
            .source(),
            ActionSource::UserKeypad
        );
        assert_eq!(CallbackEvent::Connect.source(), ActionSource::WorldAction);
        assert_eq!(CallbackEvent::Install.source(), ActionSource::Unknown);
    }
}
