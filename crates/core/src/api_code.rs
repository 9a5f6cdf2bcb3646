//! The legacy script API result codes.
//!
//! Every host API function visible to plugin scripts resolves to exactly one
//! of these codes (optionally paired with a reason string). The numeric
//! values are load-bearing: decades of plugin scripts compare against them,
//! so they are kept byte-for-byte compatible with the legacy client.

use serde::{Deserialize, Serialize};

/// Result code returned by every script-visible API function.
///
/// Two legacy quirks are preserved deliberately: `PluginCouldNotSaveState`
/// shares 30037 with `PluginDoesNotSaveState`, and `ArrayDoesNotExist`
/// shares 30056 with `BadKeyName`. The duplicated values cannot both be
/// enum discriminants, so the aliased names are provided as associated
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ApiCode {
    /// No error
    Ok = 0,
    /// The world is already open
    WorldOpen = 30001,
    /// The world is closed, this action cannot be performed
    WorldClosed = 30002,
    /// No name has been specified where one is required
    NoNameSpecified = 30003,
    /// The sound file could not be played
    CannotPlaySound = 30004,
    /// The specified trigger name does not exist
    TriggerNotFound = 30005,
    /// Attempt to add a trigger that already exists
    TriggerAlreadyExists = 30006,
    /// The trigger "match" string cannot be empty
    TriggerCannotBeEmpty = 30007,
    /// The name of this object is invalid
    InvalidObjectLabel = 30008,
    /// Script name is not in the script file
    ScriptNameNotLocated = 30009,
    /// The specified alias name does not exist
    AliasNotFound = 30010,
    /// Attempt to add an alias that already exists
    AliasAlreadyExists = 30011,
    /// The alias "match" string cannot be empty
    AliasCannotBeEmpty = 30012,
    /// Unable to open requested file
    CouldNotOpenFile = 30013,
    /// Log file was not open
    LogFileNotOpen = 30014,
    /// Log file was already open
    LogFileAlreadyOpen = 30015,
    /// Bad write to log file
    LogFileBadWrite = 30016,
    /// The specified timer name does not exist
    TimerNotFound = 30017,
    /// Attempt to add a timer that already exists
    TimerAlreadyExists = 30018,
    /// Attempt to delete a variable that does not exist
    VariableNotFound = 30019,
    /// Attempt to use SetCommand with a non-empty command window
    CommandNotEmpty = 30020,
    /// Bad regular expression syntax
    BadRegularExpression = 30021,
    /// Time given to AddTimer is invalid
    TimeInvalid = 30022,
    /// Direction given to AddToMapper is invalid
    BadMapItem = 30023,
    /// No items in mapper
    NoMapItems = 30024,
    /// Option name not found
    UnknownOption = 30025,
    /// New value for option is out of range
    OptionOutOfRange = 30026,
    /// Trigger sequence value invalid
    TriggerSequenceOutOfRange = 30027,
    /// Where to send trigger text to is invalid
    TriggerSendToInvalid = 30028,
    /// Trigger label not specified/invalid for 'send to variable'
    TriggerLabelNotSpecified = 30029,
    /// File name specified for plugin not found
    PluginFileNotFound = 30030,
    /// There was a parsing or other problem loading the plugin
    ProblemsLoadingPlugin = 30031,
    /// Plugin is not allowed to set this option
    PluginCannotSetOption = 30032,
    /// Plugin is not allowed to get this option
    PluginCannotGetOption = 30033,
    /// Requested plugin is not installed
    NoSuchPlugin = 30034,
    /// Only a plugin can do this
    NotAPlugin = 30035,
    /// Plugin does not support that subroutine (subroutine not in script)
    NoSuchRoutine = 30036,
    /// Plugin does not support saving state
    PluginDoesNotSaveState = 30037,
    /// Plugin is currently disabled
    PluginDisabled = 30039,
    /// Could not call plugin routine
    ErrorCallingPluginRoutine = 30040,
    /// Calls to "Execute" nested too deeply
    CommandsNestedTooDeeply = 30041,
    /// Unable to create socket for chat connection
    CannotCreateChatSocket = 30042,
    /// Unable to do DNS (domain name) lookup for chat connection
    CannotLookupDomainName = 30043,
    /// No chat connections open
    NoChatConnections = 30044,
    /// Requested chat person not connected
    ChatPersonNotFound = 30045,
    /// General problem with a parameter to a script call
    BadParameter = 30046,
    /// Already listening for incoming chats
    ChatAlreadyListening = 30047,
    /// Chat session with that ID not found
    ChatIdNotFound = 30048,
    /// Already connected to that server/port
    ChatAlreadyConnected = 30049,
    /// Cannot get (text from the) clipboard
    ClipboardEmpty = 30050,
    /// Cannot open the specified file
    FileNotFound = 30051,
    /// Already transferring a file
    AlreadyTransferringFile = 30052,
    /// Not transferring a file
    NotTransferringFile = 30053,
    /// There is not a command of that name
    NoSuchCommand = 30054,
    /// That array already exists
    ArrayAlreadyExists = 30055,
    /// That name is not permitted for a key
    BadKeyName = 30056,
    /// Values to be imported into array are not in pairs
    ArrayNotEvenNumberOfValues = 30057,
    /// Import succeeded, however some values were overwritten
    ImportedWithDuplicates = 30058,
    /// Import/export delimiter must be a single character, other than backslash
    BadDelimiter = 30059,
    /// Array element set, existing value overwritten
    SetReplacingExistingValue = 30060,
    /// Array key does not exist
    KeyDoesNotExist = 30061,
    /// Cannot import because cannot find unused temporary character
    CannotImport = 30062,
    /// Cannot delete trigger/alias/timer because it is executing a script
    ItemInUse = 30063,
    /// Spell checker is not active
    SpellCheckNotActive = 30064,
    /// Cannot create requested font
    CannotAddFont = 30065,
    /// Invalid settings for pen parameter
    PenStyleNotValid = 30066,
    /// Bitmap image could not be loaded
    UnableToLoadImage = 30067,
    /// Image has not been loaded into window
    ImageNotInstalled = 30068,
    /// Number of points supplied is incorrect
    InvalidNumberOfPoints = 30069,
    /// Point is not numeric
    InvalidPoint = 30070,
    /// Hotspot processing must all be in same plugin
    HotspotPluginChanged = 30071,
    /// Hotspot has not been defined for this window
    HotspotNotInstalled = 30072,
    /// Requested miniwindow does not exist
    NoSuchWindow = 30073,
    /// Invalid settings for brush parameter
    BrushStyleNotValid = 30074,
}

impl ApiCode {
    /// Legacy alias: shares 30037 with `PluginDoesNotSaveState`.
    pub const PLUGIN_COULD_NOT_SAVE_STATE: ApiCode = ApiCode::PluginDoesNotSaveState;
    /// Legacy alias: shares 30056 with `BadKeyName`.
    pub const ARRAY_DOES_NOT_EXIST: ApiCode = ApiCode::BadKeyName;

    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, ApiCode::Ok)
    }

    /// Human-readable description, matching the legacy documentation.
    pub const fn description(self) -> &'static str {
        match self {
            ApiCode::Ok => "No error",
            ApiCode::WorldOpen => "The world is already open",
            ApiCode::WorldClosed => "The world is closed, this action cannot be performed",
            ApiCode::NoNameSpecified => "No name has been specified where one is required",
            ApiCode::CannotPlaySound => "The sound file could not be played",
            ApiCode::TriggerNotFound => "The specified trigger name does not exist",
            ApiCode::TriggerAlreadyExists => "Attempt to add a trigger that already exists",
            ApiCode::TriggerCannotBeEmpty => "The trigger \"match\" string cannot be empty",
            ApiCode::InvalidObjectLabel => "The name of this object is invalid",
            ApiCode::ScriptNameNotLocated => "Script name is not in the script file",
            ApiCode::AliasNotFound => "The specified alias name does not exist",
            ApiCode::AliasAlreadyExists => "Attempt to add an alias that already exists",
            ApiCode::AliasCannotBeEmpty => "The alias \"match\" string cannot be empty",
            ApiCode::CouldNotOpenFile => "Unable to open requested file",
            ApiCode::LogFileNotOpen => "Log file was not open",
            ApiCode::LogFileAlreadyOpen => "Log file was already open",
            ApiCode::LogFileBadWrite => "Bad write to log file",
            ApiCode::TimerNotFound => "The specified timer name does not exist",
            ApiCode::TimerAlreadyExists => "Attempt to add a timer that already exists",
            ApiCode::VariableNotFound => "Attempt to delete a variable that does not exist",
            ApiCode::CommandNotEmpty => {
                "Attempt to use SetCommand with a non-empty command window"
            }
            ApiCode::BadRegularExpression => "Bad regular expression syntax",
            ApiCode::TimeInvalid => "Time given to AddTimer is invalid",
            ApiCode::BadMapItem => "Direction given to AddToMapper is invalid",
            ApiCode::NoMapItems => "No items in mapper",
            ApiCode::UnknownOption => "Option name not found",
            ApiCode::OptionOutOfRange => "New value for option is out of range",
            ApiCode::TriggerSequenceOutOfRange => "Trigger sequence value invalid",
            ApiCode::TriggerSendToInvalid => "Where to send trigger text to is invalid",
            ApiCode::TriggerLabelNotSpecified => {
                "Trigger label not specified/invalid for 'send to variable'"
            }
            ApiCode::PluginFileNotFound => "File name specified for plugin not found",
            ApiCode::ProblemsLoadingPlugin => {
                "There was a parsing or other problem loading the plugin"
            }
            ApiCode::PluginCannotSetOption => "Plugin is not allowed to set this option",
            ApiCode::PluginCannotGetOption => "Plugin is not allowed to get this option",
            ApiCode::NoSuchPlugin => "Requested plugin is not installed",
            ApiCode::NotAPlugin => "Only a plugin can do this",
            ApiCode::NoSuchRoutine => "Plugin does not support that subroutine",
            ApiCode::PluginDoesNotSaveState => "Plugin does not support saving state",
            ApiCode::PluginDisabled => "Plugin is currently disabled",
            ApiCode::ErrorCallingPluginRoutine => "Could not call plugin routine",
            ApiCode::CommandsNestedTooDeeply => "Calls to \"Execute\" nested too deeply",
            ApiCode::CannotCreateChatSocket => "Unable to create socket for chat connection",
            ApiCode::CannotLookupDomainName => "Unable to do DNS lookup for chat connection",
            ApiCode::NoChatConnections => "No chat connections open",
            ApiCode::ChatPersonNotFound => "Requested chat person not connected",
            ApiCode::BadParameter => "General problem with a parameter to a script call",
            ApiCode::ChatAlreadyListening => "Already listening for incoming chats",
            ApiCode::ChatIdNotFound => "Chat session with that ID not found",
            ApiCode::ChatAlreadyConnected => "Already connected to that server/port",
            ApiCode::ClipboardEmpty => "Cannot get text from the clipboard",
            ApiCode::FileNotFound => "Cannot open the specified file",
            ApiCode::AlreadyTransferringFile => "Already transferring a file",
            ApiCode::NotTransferringFile => "Not transferring a file",
            ApiCode::NoSuchCommand => "There is not a command of that name",
            ApiCode::ArrayAlreadyExists => "That array already exists",
            ApiCode::BadKeyName => "That name is not permitted for a key",
            ApiCode::ArrayNotEvenNumberOfValues => {
                "Values to be imported into array are not in pairs"
            }
            ApiCode::ImportedWithDuplicates => {
                "Import succeeded, however some values were overwritten"
            }
            ApiCode::BadDelimiter => {
                "Import/export delimiter must be a single character, other than backslash"
            }
            ApiCode::SetReplacingExistingValue => {
                "Array element set, existing value overwritten"
            }
            ApiCode::KeyDoesNotExist => "Array key does not exist",
            ApiCode::CannotImport => {
                "Cannot import because cannot find unused temporary character"
            }
            ApiCode::ItemInUse => {
                "Cannot delete trigger/alias/timer because it is executing a script"
            }
            ApiCode::SpellCheckNotActive => "Spell checker is not active",
            ApiCode::CannotAddFont => "Cannot create requested font",
            ApiCode::PenStyleNotValid => "Invalid settings for pen parameter",
            ApiCode::UnableToLoadImage => "Bitmap image could not be loaded",
            ApiCode::ImageNotInstalled => "Image has not been loaded into window",
            ApiCode::InvalidNumberOfPoints => "Number of points supplied is incorrect",
            ApiCode::InvalidPoint => "Point is not numeric",
            ApiCode::HotspotPluginChanged => "Hotspot processing must all be in same plugin",
            ApiCode::HotspotNotInstalled => "Hotspot has not been defined for this window",
            ApiCode::NoSuchWindow => "Requested miniwindow does not exist",
            ApiCode::BrushStyleNotValid => "Invalid settings for brush parameter",
        }
    }
}

impl From<ApiCode> for i32 {
    fn from(code: ApiCode) -> i32 {
        code as i32
    }
}

impl From<ApiCode> for i64 {
    fn from(code: ApiCode) -> i64 {
        code as i32 as i64
    }
}

impl std::fmt::Display for ApiCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

impl std::error::Error for ApiCode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_numeric_values() {
        assert_eq!(ApiCode::Ok.code(), 0);
        assert_eq!(ApiCode::WorldOpen.code(), 30001);
        assert_eq!(ApiCode::AliasNotFound.code(), 30010);
        assert_eq!(ApiCode::UnknownOption.code(), 30025);
        assert_eq!(ApiCode::NoSuchPlugin.code(), 30034);
        assert_eq!(ApiCode::NoSuchRoutine.code(), 30036);
        assert_eq!(ApiCode::PluginDisabled.code(), 30039);
        assert_eq!(ApiCode::ErrorCallingPluginRoutine.code(), 30040);
        assert_eq!(ApiCode::BadParameter.code(), 30046);
        assert_eq!(ApiCode::BrushStyleNotValid.code(), 30074);
    }

    #[test]
    fn test_legacy_aliased_values() {
        assert_eq!(ApiCode::PLUGIN_COULD_NOT_SAVE_STATE.code(), 30037);
        assert_eq!(ApiCode::ARRAY_DOES_NOT_EXIST.code(), 30056);
    }

    #[test]
    fn test_is_ok() {
        assert!(ApiCode::Ok.is_ok());
        assert!(!ApiCode::BadParameter.is_ok());
    }
}
