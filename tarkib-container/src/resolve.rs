//! Type resolution and effective-configuration lookup.
//!
//! Two related but deliberately independent redirections live here:
//!
//! - [`resolve_type`] maps a requested name to the concrete type to
//!   instantiate (preference first, then virtual base type).
//! - [`effective_config`] finds the construction config for a name,
//!   re-applying the preference redirect on its own.
//!
//! Both apply exactly one hop of indirection and never chain. If a
//! preference target is itself aliased under a different key the two
//! lookups can disagree; that behavior is intentional and kept as-is.

use crate::config::{ArgumentSpecMap, ContainerConfig};

/// Maps a requested type name to the concrete instantiable type.
///
/// Precedence: preference entry (terminal, no further resolution),
/// then virtual-type base, then the name unchanged. Never fails.
pub fn resolve_type<'a>(config: &'a ContainerConfig, type_name: &'a str) -> &'a str {
    if let Some(preferred) = config.preferences.get(type_name) {
        return preferred;
    }
    if let Some(virtual_type) = config.virtual_types.get(type_name) {
        return &virtual_type.base_type;
    }
    type_name
}

/// The construction config in effect for a type name.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveConfig<'a> {
    /// Whether instances of this type should be cached by the
    /// shared-get path's `is_shared` decision.
    pub shared: bool,
    /// Configured argument specs, if any.
    pub arguments: Option<&'a ArgumentSpecMap>,
}

/// Finds the effective construction config for `type_name`.
///
/// The name is rebound through the preference map for this lookup only;
/// then a virtual-type entry wins over a type-config entry. A virtual
/// type carries no shared flag of its own, so it is never shared.
/// Absent any entry the config is empty: not shared, no arguments.
pub fn effective_config<'a>(config: &'a ContainerConfig, type_name: &str) -> EffectiveConfig<'a> {
    let type_name = config
        .preferences
        .get(type_name)
        .map(String::as_str)
        .unwrap_or(type_name);

    if let Some(virtual_type) = config.virtual_types.get(type_name) {
        return EffectiveConfig {
            shared: false,
            arguments: Some(&virtual_type.arguments),
        };
    }

    if let Some(type_config) = config.types.get(type_name) {
        return EffectiveConfig {
            shared: type_config.shared,
            arguments: Some(&type_config.arguments),
        };
    }

    EffectiveConfig {
        shared: false,
        arguments: None,
    }
}
