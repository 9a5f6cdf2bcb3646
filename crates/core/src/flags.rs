//! Sender flag bits.
//!
//! Plugin scripts pass these as plain integers to AddAlias/AddTimer/
//! AddTrigger, so the values are fixed by the legacy API.

/// Flags accepted by `AddAlias`.
pub mod alias {
    pub const ENABLED: i64 = 1;
    pub const KEEP_EVALUATING: i64 = 8;
    pub const IGNORE_CASE: i64 = 32;
    pub const OMIT_FROM_LOG_FILE: i64 = 64;
    pub const REGULAR_EXPRESSION: i64 = 128;
    pub const EXPAND_VARIABLES: i64 = 512;
    pub const REPLACE: i64 = 1024;
    pub const SPEED_WALK: i64 = 2048;
    pub const QUEUE: i64 = 4096;
    pub const MENU: i64 = 8192;
    pub const TEMPORARY: i64 = 16384;
    pub const ONE_SHOT: i64 = 32768;
}

/// Flags accepted by `AddTimer`.
pub mod timer {
    pub const ENABLED: i64 = 1;
    /// If not set, time is "every"
    pub const AT_TIME: i64 = 2;
    pub const ONE_SHOT: i64 = 4;
    pub const SPEED_WALK: i64 = 8;
    pub const NOTE: i64 = 16;
    pub const ACTIVE_WHEN_CLOSED: i64 = 32;
    pub const REPLACE: i64 = 1024;
    pub const TEMPORARY: i64 = 16384;
}

/// Flags accepted by `AddTrigger` / `AddTriggerEx`.
pub mod trigger {
    pub const ENABLED: i64 = 1;
    pub const OMIT_FROM_LOG: i64 = 2;
    pub const OMIT_FROM_OUTPUT: i64 = 4;
    pub const KEEP_EVALUATING: i64 = 8;
    pub const IGNORE_CASE: i64 = 16;
    pub const REGULAR_EXPRESSION: i64 = 32;
    pub const EXPAND_VARIABLES: i64 = 512;
    pub const REPLACE: i64 = 1024;
    pub const LOWERCASE_WILDCARD: i64 = 2048;
    pub const TEMPORARY: i64 = 16384;
    pub const ONE_SHOT: i64 = 32768;
}

/// Returns true if `flags` contains `flag`.
pub const fn has_flag(flags: i64, flag: i64) -> bool {
    flags & flag != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values_match_legacy_table() {
        assert_eq!(alias::REGULAR_EXPRESSION, 128);
        assert_eq!(trigger::REGULAR_EXPRESSION, 32);
        assert_eq!(timer::AT_TIME, 2);
        assert_eq!(alias::TEMPORARY, trigger::TEMPORARY);
    }

    #[test]
    fn test_has_flag() {
        let flags = trigger::ENABLED | trigger::REPLACE;
        assert!(has_flag(flags, trigger::ENABLED));
        assert!(has_flag(flags, trigger::REPLACE));
        assert!(!has_flag(flags, trigger::ONE_SHOT));
    }
}
