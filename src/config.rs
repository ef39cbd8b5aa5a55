//! Process configuration.
//!
//! Loose boolean parsing for environment-style settings, and the process-wide
//! [`MapStrategy`] used by the canonical map builder. The strategy is chosen
//! once, on first use or through [`MapStrategy::install`], and never changes
//! afterwards.

use std::fmt::{self, Display};
use std::sync::{LazyLock, OnceLock};

use regex::Regex;

static TRUTHY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A(?:1|use|true|truthy|yes|y)\z").expect("truthy pattern is valid")
});

static FALSEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A(?:0|skip|false|falsey|no|n)\z").expect("falsey pattern is valid")
});

static ACTIVE_STRATEGY: OnceLock<MapStrategy> = OnceLock::new();

/// Returns whether `input` reads as true.
///
/// With `explicit` set, only the truthy spellings (`1`, `use`, `true`,
/// `truthy`, `yes`, `y`, any case) count. Without it, anything that is not
/// one of the falsey spellings counts, including a missing value.
///
/// ```rust
/// use validated_command::config::truthy;
///
/// assert!(truthy(Some("YES"), true));
/// assert!(!truthy(None, true));
/// assert!(truthy(None, false));
/// assert!(!truthy(Some("skip"), false));
/// ```
pub fn truthy(input: Option<&str>, explicit: bool) -> bool {
    let input = input.unwrap_or_default();
    if explicit {
        TRUTHY.is_match(input)
    } else {
        !FALSEY.is_match(input)
    }
}

/// Returns whether `input` reads as false.
///
/// The mirror image of [`truthy`]: with `explicit` set only the falsey
/// spellings count; without it anything that is not truthy counts.
pub fn falsey(input: Option<&str>, explicit: bool) -> bool {
    let input = input.unwrap_or_default();
    if explicit {
        FALSEY.is_match(input)
    } else {
        !TRUTHY.is_match(input)
    }
}

/// Reads a JSON option value (`true`, `"yes"`, `1`, ...) as an explicit truthy flag.
pub fn truthy_value(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => truthy(Some(s), true),
        Some(Value::Number(n)) => truthy(Some(&n.to_string()), true),
        Some(_) => true,
    }
}

/// How the canonical map builder orders keys while merging fragments.
///
/// Every strategy stores string keys and answers lookups identically; they
/// differ only in iteration order, which callers must not rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapStrategy {
    /// Overwritten keys move to the end, so iteration reflects the most
    /// recent fragment to set each key.
    Recency,
    /// Overwritten keys keep the position where they first appeared.
    Insertion,
    /// Keys are kept in sorted order.
    Plain,
}

impl MapStrategy {
    /// Environment variable that asks for plain, sorted maps.
    pub const ENV_VAR: &'static str = "VALIDATED_COMMAND_PLAIN_MAPS";

    /// Resolves the strategy from the process environment.
    pub fn from_env() -> Self {
        Self::from_setting(std::env::var(Self::ENV_VAR).ok().as_deref())
    }

    /// Resolves the strategy from the raw value of [`Self::ENV_VAR`].
    ///
    /// Only an explicitly truthy value selects [`MapStrategy::Plain`]; a
    /// missing or unrecognized value prefers the richest strategy built in.
    pub fn from_setting(setting: Option<&str>) -> Self {
        if falsey(setting, false) {
            Self::richest()
        } else {
            MapStrategy::Plain
        }
    }

    #[cfg(feature = "recency")]
    fn richest() -> Self {
        MapStrategy::Recency
    }

    #[cfg(not(feature = "recency"))]
    fn richest() -> Self {
        tracing::warn!(
            "recency-ordered maps are not compiled in (enable the `recency` feature); \
             falling back to insertion order"
        );
        MapStrategy::Insertion
    }

    /// Returns the strategy active for this process, resolving it from the
    /// environment on first call.
    pub fn active() -> Self {
        *ACTIVE_STRATEGY.get_or_init(|| {
            let strategy = Self::from_env();
            tracing::debug!(%strategy, "canonical map strategy selected");
            strategy
        })
    }

    /// Fixes the process-wide strategy before anything reads it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyInstalled`] if a strategy has already
    /// been installed or resolved.
    pub fn install(self) -> Result<(), ConfigError> {
        ACTIVE_STRATEGY
            .set(self)
            .map_err(|_| ConfigError::AlreadyInstalled {
                active: Self::active(),
            })
    }
}

impl Display for MapStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapStrategy::Recency => "recency",
            MapStrategy::Insertion => "insertion",
            MapStrategy::Plain => "plain",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised while configuring the process.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The map strategy is fixed once chosen.
    #[error("map strategy already set to '{active}'")]
    AlreadyInstalled {
        /// The strategy that stays in effect.
        active: MapStrategy,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy_spellings() {
        for word in ["1", "use", "true", "truthy", "yes", "y", "TRUE", "Yes"] {
            assert!(truthy(Some(word), true), "{word} should be truthy");
            assert!(!falsey(Some(word), true), "{word} should not be falsey");
        }
    }

    #[test]
    fn test_falsey_spellings() {
        for word in ["0", "skip", "false", "falsey", "no", "n", "NO", "Skip"] {
            assert!(falsey(Some(word), true), "{word} should be falsey");
            assert!(!truthy(Some(word), true), "{word} should not be truthy");
        }
    }

    #[test]
    fn test_partial_words_do_not_match() {
        assert!(!truthy(Some("yess"), true));
        assert!(!falsey(Some("nope"), true));
    }

    #[test]
    fn test_implicit_mode_resolves_unknown_values() {
        assert!(truthy(Some("maybe"), false));
        assert!(falsey(Some("maybe"), false));
        assert!(truthy(None, false));
        assert!(falsey(None, false));
    }

    #[test]
    fn test_truthy_value() {
        assert!(truthy_value(Some(&json!(true))));
        assert!(truthy_value(Some(&json!("yes"))));
        assert!(truthy_value(Some(&json!(1))));
        assert!(!truthy_value(Some(&json!(false))));
        assert!(!truthy_value(Some(&json!(0))));
        assert!(!truthy_value(Some(&json!(null))));
        assert!(!truthy_value(None));
    }

    #[test]
    fn test_strategy_from_setting() {
        assert_eq!(MapStrategy::from_setting(Some("yes")), MapStrategy::Plain);
        assert_eq!(MapStrategy::from_setting(Some("1")), MapStrategy::Plain);
        assert_ne!(MapStrategy::from_setting(None), MapStrategy::Plain);
        assert_ne!(MapStrategy::from_setting(Some("no")), MapStrategy::Plain);
        assert_ne!(MapStrategy::from_setting(Some("garbage")), MapStrategy::Plain);
    }

    #[cfg(feature = "recency")]
    #[test]
    fn test_default_strategy_is_recency() {
        assert_eq!(MapStrategy::from_setting(None), MapStrategy::Recency);
    }

    #[test]
    fn test_install_after_resolution_fails() {
        let active = MapStrategy::active();
        let err = MapStrategy::Plain.install().unwrap_err();
        match err {
            ConfigError::AlreadyInstalled { active: kept } => assert_eq!(kept, active),
        }
        assert_eq!(MapStrategy::active(), active);
    }
}
