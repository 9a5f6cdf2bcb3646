//! Lua plugin runtime for the Mudlark MUD client.
//!
//! Each installed plugin owns an isolated Lua 5.4 interpreter carrying the
//! legacy world-scripting API. The client drives the [`PluginRegistry`]
//! with events (lines received, commands entered, telnet negotiation,
//! window interactions); plugins observe them through named `OnPlugin*`
//! callbacks, and may veto or rewrite the event where the callback's
//! policy allows. Everything a script can affect in the outside world
//! funnels through the [`Host`] trait.

pub mod api;
pub mod callback;
pub mod error;
pub mod filter;
pub mod host;
pub mod marshal;
pub mod plugin;
pub mod registry;
pub mod thread;

pub use callback::{CallbackEvent, CallbackInvocation, CallbackOutcome};
pub use error::ScriptOutcome;
pub use filter::CallbackFilter;
pub use host::{
    AliasSpec, Host, HotspotSpec, SendOptions, SenderAccessResult, SenderKind, TimerSpec,
    TriggerSpec, WindowRect, WindowSpec,
};
pub use marshal::ScriptValue;
pub use plugin::{Plugin, PluginMetadata, PluginPack};
pub use registry::PluginRegistry;
pub use thread::{CallPluginResult, PendingCallback};
