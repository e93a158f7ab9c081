use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use relay_types::{Selector, Target};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GateError;
use crate::traits::AllowListProvider;

/// Per-target permission state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub allowed: bool,
    pub scoped: bool,
    /// Selector entries. Stored even while the target is unscoped so that
    /// scoping it later picks them up.
    #[serde(default)]
    pub selectors: BTreeMap<Selector, bool>,
}

impl TargetConfig {
    /// `allowed && (!scoped || selectors[selector])`
    pub fn permits(&self, selector: &Selector) -> bool {
        if !self.allowed {
            return false;
        }
        if !self.scoped {
            return true;
        }
        self.selectors.get(selector).copied().unwrap_or(false)
    }

    /// Selectors currently set to `true`.
    pub fn allowed_selectors(&self) -> impl Iterator<Item = &Selector> {
        self.selectors
            .iter()
            .filter_map(|(sel, allowed)| allowed.then_some(sel))
    }
}

/// Serialisable copy of the whole allow-list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowListSnapshot {
    pub targets: BTreeMap<Target, TargetConfig>,
}

/// Allow-list Store.
///
/// All state sits behind one `RwLock`, so a mutation is never observed
/// half-applied by a concurrent `is_permitted`. Mutators return whether they
/// changed observable state; re-setting a value is a no-op, never an error.
///
/// Mutators perform no authorization themselves: callers reach them through
/// the governance facade, which checks the caller first.
pub struct AllowListStore {
    targets: RwLock<HashMap<Target, TargetConfig>>,
}

impl AllowListStore {
    pub fn new() -> Self {
        Self {
            targets: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: AllowListSnapshot) -> Self {
        Self {
            targets: RwLock::new(snapshot.targets.into_iter().collect()),
        }
    }

    /// Set or clear global callability of a target. Scoping and selector
    /// entries are left untouched.
    ///
    /// Setters never create an entry just to store a default value, so an
    /// unconfigured target stays unlisted.
    pub fn set_target_allowed(&self, target: &Target, allowed: bool) -> Result<bool, GateError> {
        let mut targets = self.write()?;
        if !allowed && !targets.contains_key(target) {
            return Ok(false);
        }
        let entry = targets.entry(*target).or_default();
        let changed = entry.allowed != allowed;
        entry.allowed = allowed;
        debug!(target = %target, allowed, changed, "target allowed flag set");
        Ok(changed)
    }

    /// Toggle whether per-selector checks apply to a target.
    pub fn set_scoped(&self, target: &Target, scoped: bool) -> Result<bool, GateError> {
        let mut targets = self.write()?;
        if !scoped && !targets.contains_key(target) {
            return Ok(false);
        }
        let entry = targets.entry(*target).or_default();
        let changed = entry.scoped != scoped;
        entry.scoped = scoped;
        debug!(target = %target, scoped, changed, "target scoping set");
        Ok(changed)
    }

    /// Set one (target, selector) entry.
    pub fn set_allowed_function(
        &self,
        target: &Target,
        selector: &Selector,
        allowed: bool,
    ) -> Result<bool, GateError> {
        let mut targets = self.write()?;
        if !allowed && !targets.contains_key(target) {
            return Ok(false);
        }
        let entry = targets.entry(*target).or_default();
        let previous = entry.selectors.get(selector).copied().unwrap_or(false);
        // An explicit `false` is kept rather than removed so snapshots show
        // what governance last said about the selector.
        entry.selectors.insert(*selector, allowed);
        let changed = previous != allowed;
        debug!(target = %target, selector = %selector, allowed, changed, "selector entry set");
        Ok(changed)
    }

    /// Configuration of one target; `None` if governance never touched it.
    pub fn target_config(&self, target: &Target) -> Result<Option<TargetConfig>, GateError> {
        Ok(self.read()?.get(target).cloned())
    }

    /// Every target governance has configured, sorted.
    pub fn targets(&self) -> Result<Vec<Target>, GateError> {
        let mut out: Vec<Target> = self.read()?.keys().copied().collect();
        out.sort();
        Ok(out)
    }

    pub fn snapshot(&self) -> Result<AllowListSnapshot, GateError> {
        let targets = self.read()?;
        Ok(AllowListSnapshot {
            targets: targets.iter().map(|(t, c)| (*t, c.clone())).collect(),
        })
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Target, TargetConfig>>, GateError> {
        self.targets
            .read()
            .map_err(|_| GateError::LockPoisoned("allow-list"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<Target, TargetConfig>>, GateError> {
        self.targets
            .write()
            .map_err(|_| GateError::LockPoisoned("allow-list"))
    }
}

impl Default for AllowListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AllowListProvider for AllowListStore {
    fn is_permitted(&self, target: &Target, selector: &Selector) -> Result<bool, GateError> {
        Ok(self
            .read()?
            .get(target)
            .map(|config| config.permits(selector))
            .unwrap_or(false))
    }
}
