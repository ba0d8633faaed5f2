//! Translation between host HVAC modes and a circuit's mode vocabulary.
//!
//! The fixed table is `auto → Auto`, `manual → Heat`, `off → Off`,
//! `on → Heat`, keyed by the circuit's display strings. A [`ModeMap`] only
//! holds entries for modes that are both in the table and currently allowed
//! by the device, and is rebuilt from scratch on every update cycle.

use std::collections::BTreeMap;

use boschhub_domain::climate::HvacMode;

use crate::upstream::ModeStrings;

/// Two-way mapping between host modes and upstream mode strings.
///
/// The inverse map is always the exact reverse of the forward map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeMap {
    forward: BTreeMap<HvacMode, String>,
    inverse: BTreeMap<String, HvacMode>,
}

impl ModeMap {
    /// Map exposing only `Auto`, used until the device reports its allowed modes.
    #[must_use]
    pub fn fallback(strings: &ModeStrings) -> Self {
        let mut map = Self::default();
        map.insert(HvacMode::Auto, strings.auto.clone());
        map
    }

    /// Build the map for the given allowed mode keys.
    ///
    /// `None` or an empty list yields [`fallback`](Self::fallback). Keys the
    /// string table or the translation table do not know are dropped. When
    /// two allowed keys translate to the same host mode, the one equal to
    /// `current` wins, otherwise the first one.
    #[must_use]
    pub fn rebuild(
        strings: &ModeStrings,
        allowed: Option<&[String]>,
        current: Option<&str>,
    ) -> Self {
        let Some(allowed) = allowed.filter(|keys| !keys.is_empty()) else {
            return Self::fallback(strings);
        };

        let table = translation_table(strings);
        let mut map = Self::default();
        for key in allowed {
            let Some(display) = strings.get(key) else {
                tracing::trace!(key = %key, "mode key missing from string table");
                continue;
            };
            let Some(mode) = table
                .iter()
                .find_map(|(upstream, mode)| (*upstream == display).then_some(*mode))
            else {
                tracing::trace!(key = %key, "mode has no host translation");
                continue;
            };
            if let Some(mapped) = map.forward.get(&mode) {
                if current != Some(display) {
                    tracing::trace!(key = %key, mode = %mode, "host mode already mapped");
                    continue;
                }
                let replaced = mapped.clone();
                map.inverse.remove(&replaced);
            }
            map.insert(mode, display.to_string());
        }
        map
    }

    fn insert(&mut self, mode: HvacMode, upstream: String) {
        self.inverse.insert(upstream.clone(), mode);
        self.forward.insert(mode, upstream);
    }

    /// Upstream mode string for a host mode.
    #[must_use]
    pub fn upstream_for(&self, mode: HvacMode) -> Option<&str> {
        self.forward.get(&mode).map(String::as_str)
    }

    /// Host mode for an upstream mode string.
    #[must_use]
    pub fn host_for(&self, upstream: &str) -> Option<HvacMode> {
        self.inverse.get(upstream).copied()
    }

    /// Host modes currently available, in a stable order.
    #[must_use]
    pub fn modes(&self) -> Vec<HvacMode> {
        self.forward.keys().copied().collect()
    }
}

fn translation_table(strings: &ModeStrings) -> [(&str, HvacMode); 4] {
    [
        (strings.auto.as_str(), HvacMode::Auto),
        (strings.manual.as_str(), HvacMode::Heat),
        (strings.off.as_str(), HvacMode::Off),
        (strings.on.as_str(), HvacMode::Heat),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn should_map_only_allowed_modes() {
        let allowed = keys(&["auto", "off"]);
        let map = ModeMap::rebuild(&ModeStrings::default(), Some(allowed.as_slice()), None);

        assert_eq!(map.forward.len(), 2);
        assert_eq!(map.upstream_for(HvacMode::Auto), Some("auto"));
        assert_eq!(map.upstream_for(HvacMode::Off), Some("off"));
        assert_eq!(map.upstream_for(HvacMode::Heat), None);
        assert_eq!(map.host_for("auto"), Some(HvacMode::Auto));
        assert_eq!(map.host_for("off"), Some(HvacMode::Off));
    }

    #[test]
    fn should_fall_back_to_auto_when_nothing_reported() {
        let map = ModeMap::rebuild(&ModeStrings::default(), None, None);
        assert_eq!(map.modes(), vec![HvacMode::Auto]);
        assert_eq!(map.host_for("auto"), Some(HvacMode::Auto));
    }

    #[test]
    fn should_fall_back_to_auto_when_allowed_list_is_empty() {
        let map = ModeMap::rebuild(&ModeStrings::default(), Some(&[][..]), None);
        assert_eq!(map, ModeMap::fallback(&ModeStrings::default()));
    }

    #[test]
    fn should_use_display_string_of_auto_in_fallback() {
        let strings = ModeStrings {
            auto: "clock".to_string(),
            ..ModeStrings::default()
        };
        let map = ModeMap::fallback(&strings);
        assert_eq!(map.upstream_for(HvacMode::Auto), Some("clock"));
    }

    #[test]
    fn should_translate_manual_to_heat() {
        let allowed = keys(&["manual"]);
        let map = ModeMap::rebuild(&ModeStrings::default(), Some(allowed.as_slice()), None);
        assert_eq!(map.upstream_for(HvacMode::Heat), Some("manual"));
    }

    #[test]
    fn should_drop_modes_without_translation() {
        let allowed = keys(&["auto", "holiday", "eco"]);
        let map = ModeMap::rebuild(&ModeStrings::default(), Some(allowed.as_slice()), None);
        assert_eq!(map.modes(), vec![HvacMode::Auto]);
        assert_eq!(map.host_for("holiday"), None);
    }

    #[test]
    fn should_end_up_empty_when_every_mode_is_dropped() {
        let allowed = keys(&["holiday"]);
        let map = ModeMap::rebuild(&ModeStrings::default(), Some(allowed.as_slice()), None);
        assert!(map.forward.is_empty());
    }

    #[test]
    fn should_keep_first_upstream_string_for_duplicate_host_mode() {
        let allowed = keys(&["on", "manual", "off"]);
        let map = ModeMap::rebuild(&ModeStrings::default(), Some(allowed.as_slice()), None);

        assert_eq!(map.upstream_for(HvacMode::Heat), Some("on"));
        assert_eq!(map.host_for("manual"), None);
        assert_eq!(map.forward.len(), 2);
    }

    #[test]
    fn should_prefer_current_mode_among_duplicate_host_modes() {
        let allowed = keys(&["on", "manual", "off"]);
        let map = ModeMap::rebuild(
            &ModeStrings::default(),
            Some(allowed.as_slice()),
            Some("manual"),
        );

        assert_eq!(map.upstream_for(HvacMode::Heat), Some("manual"));
        assert_eq!(map.host_for("manual"), Some(HvacMode::Heat));
        assert_eq!(map.host_for("on"), None);
        assert_eq!(map.inverse.len(), map.forward.len());
    }

    #[test]
    fn should_resolve_keys_through_string_table() {
        let strings = ModeStrings {
            manual: "manual_room".to_string(),
            ..ModeStrings::default()
        };
        let allowed = keys(&["manual"]);
        let map = ModeMap::rebuild(&strings, Some(allowed.as_slice()), None);
        assert_eq!(map.upstream_for(HvacMode::Heat), Some("manual_room"));
        assert_eq!(map.host_for("manual_room"), Some(HvacMode::Heat));
    }

    #[test]
    fn should_round_trip_every_forward_entry_through_inverse() {
        let allowed = keys(&["auto", "manual", "off", "on"]);
        let map = ModeMap::rebuild(&ModeStrings::default(), Some(allowed.as_slice()), None);

        for (mode, upstream) in &map.forward {
            assert_eq!(map.host_for(upstream), Some(*mode));
        }
        assert_eq!(map.inverse.len(), map.forward.len());
    }
}
