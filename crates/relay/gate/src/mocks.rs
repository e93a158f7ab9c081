use std::collections::HashSet;

use relay_types::{Principal, Selector, Target};

use crate::error::GateError;
use crate::traits::{AllowListProvider, ExecutorProvider};

/// Fixed allow-list for exercising the evaluator without a real store.
///
/// Permits exactly the listed (target, selector) pairs.
#[derive(Default)]
pub struct StaticAllowList {
    permitted: HashSet<(Target, Selector)>,
}

impl StaticAllowList {
    pub fn permitting(pairs: impl IntoIterator<Item = (Target, Selector)>) -> Self {
        Self {
            permitted: pairs.into_iter().collect(),
        }
    }
}

impl AllowListProvider for StaticAllowList {
    fn is_permitted(&self, target: &Target, selector: &Selector) -> Result<bool, GateError> {
        Ok(self.permitted.contains(&(*target, *selector)))
    }
}

/// Fixed executor set.
#[derive(Default)]
pub struct StaticExecutors {
    members: HashSet<Principal>,
}

impl StaticExecutors {
    pub fn of(members: impl IntoIterator<Item = Principal>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }
}

impl ExecutorProvider for StaticExecutors {
    fn is_executor(&self, principal: &Principal) -> Result<bool, GateError> {
        Ok(self.members.contains(principal))
    }
}

/// Allow-list that panics if consulted. Proves a code path never reaches
/// the allow-list lookup.
#[cfg(test)]
pub struct UnreachableAllowList;

#[cfg(test)]
impl AllowListProvider for UnreachableAllowList {
    fn is_permitted(&self, target: &Target, selector: &Selector) -> Result<bool, GateError> {
        panic!("allow-list consulted for {} / {}", target, selector);
    }
}
