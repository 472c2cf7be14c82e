//! Resolved application configuration.
//!
//! Environment and feature-flag state is resolved exactly once (by the
//! infrastructure config loader) into a [`GenerationConfig`] and passed
//! down the call chain explicitly — no component re-reads ambient
//! environment at depth.

use serde::{Deserialize, Serialize};
use sermonsmith_domain::RoutePreference;
use std::time::Duration;

/// Assistant id used when configuration leaves it unset. A provider-side
/// assistant with this id will not normally exist, in which case the
/// cascade reroutes to the single-shot provider on first use.
pub const DEFAULT_ASSISTANT_ID: &str = "asst_default";

/// Deployment environment. Only affects the unforced route default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// The deterministic route default when nothing forces a route:
    /// production runs the full assistant exchange, development uses the
    /// cheaper single-shot provider.
    pub fn default_route(&self) -> Route {
        match self {
            Environment::Production => Route::Primary,
            Environment::Development => Route::Secondary,
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Which generation path serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Conversational-assistant provider (thread/run orchestration).
    Primary,
    /// Single-shot completion provider.
    Secondary,
}

/// Poll loop bounds for the primary exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: 60,
        }
    }
}

/// Configuration resolved once per process and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Config-level force flags (mutually exclusive by convention).
    pub route: RoutePreference,
    pub environment: Environment,
    /// Provider-side assistant id; falls back to [`DEFAULT_ASSISTANT_ID`].
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub poll: PollSettings,
    /// Model used on the secondary path.
    pub completion_model: Option<String>,
}

impl GenerationConfig {
    /// The assistant id to use, applying the documented fallback.
    pub fn assistant_id(&self) -> &str {
        self.assistant_id.as_deref().unwrap_or(DEFAULT_ASSISTANT_ID)
    }

    /// Decide the route for one request.
    ///
    /// Precedence: request-level force flags, then config-level force
    /// flags, then the environment default. At every level, when both
    /// primary and secondary are forced, Primary wins.
    pub fn resolve_route(&self, request_hint: &RoutePreference) -> Route {
        for preference in [request_hint, &self.route] {
            if preference.force_primary {
                return Route::Primary;
            }
            if preference.force_secondary {
                return Route::Secondary;
            }
        }
        self.environment.default_route()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_id_fallback_constant() {
        let config = GenerationConfig::default();
        assert_eq!(config.assistant_id(), DEFAULT_ASSISTANT_ID);

        let config = GenerationConfig {
            assistant_id: Some("asst_live".to_string()),
            ..Default::default()
        };
        assert_eq!(config.assistant_id(), "asst_live");
    }

    #[test]
    fn unforced_default_follows_environment() {
        let hint = RoutePreference::default();

        let production = GenerationConfig::default();
        assert_eq!(production.resolve_route(&hint), Route::Primary);

        let development = GenerationConfig {
            environment: Environment::Development,
            ..Default::default()
        };
        assert_eq!(development.resolve_route(&hint), Route::Secondary);
    }

    #[test]
    fn config_force_flags_override_environment() {
        let config = GenerationConfig {
            environment: Environment::Production,
            route: RoutePreference::secondary(),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_route(&RoutePreference::default()),
            Route::Secondary
        );
    }

    #[test]
    fn request_hint_overrides_config_flags() {
        let config = GenerationConfig {
            route: RoutePreference::secondary(),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_route(&RoutePreference::primary()),
            Route::Primary
        );
    }

    #[test]
    fn primary_wins_when_both_forced() {
        let both = RoutePreference {
            force_primary: true,
            force_secondary: true,
        };
        let config = GenerationConfig::default();
        assert_eq!(config.resolve_route(&both), Route::Primary);

        let config = GenerationConfig {
            route: both,
            environment: Environment::Development,
            ..Default::default()
        };
        assert_eq!(
            config.resolve_route(&RoutePreference::default()),
            Route::Primary
        );
    }

    #[test]
    fn environment_parses_short_names() {
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!("PROD".parse::<Environment>(), Ok(Environment::Production));
        assert!("staging".parse::<Environment>().is_err());
    }
}
