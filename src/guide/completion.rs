use std::collections::HashSet;

use crate::types::StepId;

/// Ids of steps the user has marked done. Never persisted; a new guide starts
/// from `CompletedSet::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CompletedSet {
    done: HashSet<StepId>,
}

impl CompletedSet {
    /// Returns a copy of the set with membership of `id` inverted.
    #[must_use]
    pub fn toggle(mut self, id: &StepId) -> Self {
        if !self.done.remove(id) {
            self.done.insert(id.clone());
        }
        self
    }

    pub fn is_complete(&self, id: &StepId) -> bool {
        self.done.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::CompletedSet;
    use crate::types::StepId;

    #[test]
    fn toggle_adds_then_removes() {
        let id = StepId::Index(0);
        let set = CompletedSet::default().toggle(&id);
        assert!(set.is_complete(&id));
        let set = set.toggle(&id);
        assert!(!set.is_complete(&id));
        assert_eq!(set, CompletedSet::default());
    }

    #[test]
    fn double_toggle_restores_any_set() {
        let base = CompletedSet::default()
            .toggle(&StepId::Index(1))
            .toggle(&StepId::Line("0-a".into()));
        for id in [
            StepId::Index(1),
            StepId::Index(7),
            StepId::Line("0-a".into()),
            StepId::Line("3-b".into()),
        ] {
            assert_eq!(base.clone().toggle(&id).toggle(&id), base);
        }
    }

    #[test]
    fn index_and_line_ids_do_not_collide() {
        let set = CompletedSet::default().toggle(&StepId::Index(0));
        assert!(!set.is_complete(&StepId::Line("0".into())));
        assert!(set.is_complete(&StepId::Index(0)));
    }
}
