//! Location rule selection.
//!
//! Picking the serving strategy is kept apart from formatting it, so the
//! decision table can be tested without comparing configuration text.

/// Serving strategy for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServingRule {
    /// `location /` forwarding everything to the dev server.
    RootProxy,
    /// Document root with front-controller fallback and an FPM location.
    RootPhp,
    /// Document root with plain index fallback.
    RootStatic,
    /// Alias-based prefix locations with FPM; optionally followed by a
    /// proxy location for the same prefix.
    AliasPhp { dev_proxy: bool },
    /// Alias-based prefix location with plain index fallback; optionally
    /// followed by a proxy location for the same prefix.
    AliasStatic { dev_proxy: bool },
}

/// Decide how a route is served.
pub fn select_rule(is_root: bool, has_dev_proxy: bool, is_php: bool) -> ServingRule {
    match (is_root, has_dev_proxy, is_php) {
        (true, true, _) => ServingRule::RootProxy,
        (true, false, true) => ServingRule::RootPhp,
        (true, false, false) => ServingRule::RootStatic,
        (false, dev_proxy, true) => ServingRule::AliasPhp { dev_proxy },
        (false, dev_proxy, false) => ServingRule::AliasStatic { dev_proxy },
    }
}
