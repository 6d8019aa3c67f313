use serde::Serialize;

use super::{completion::CompletedSet, segment::segment, tree};
use crate::types::{ContentBlock, GuideData, StepId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct DisplayEntry {
    pub id: StepId,
    pub level: usize,
    pub title: String,
    pub completed: bool,
    pub blocks: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ErrorEntry {
    pub error: String,
    pub blocks: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct DisplayModel {
    pub entries: Vec<DisplayEntry>,
    pub errors: Vec<ErrorEntry>,
}

impl DisplayModel {
    /// `(done, total)` for the checklist header.
    pub fn progress(&self) -> (usize, usize) {
        let done = self.entries.iter().filter(|e| e.completed).count();
        (done, self.entries.len())
    }
}

/// Build the display model for `data` under the given completion state.
///
/// Array guides render one level-0 entry per step, titled by the step and
/// segmented from `details`. Outline guides render one entry per non-blank
/// line; the title is the line itself and the blocks are its segmentation.
pub(crate) fn render(data: &GuideData, completed: &CompletedSet) -> DisplayModel {
    match data {
        GuideData::Steps { guide, errors } => DisplayModel {
            entries: guide
                .iter()
                .enumerate()
                .map(|(index, step)| {
                    let id = StepId::Index(index);
                    DisplayEntry {
                        completed: completed.is_complete(&id),
                        id,
                        level: 0,
                        title: step.step.clone(),
                        blocks: segment(&step.details),
                    }
                })
                .collect(),
            errors: errors
                .iter()
                .map(|e| ErrorEntry {
                    error: e.error.clone(),
                    blocks: segment(&e.solution),
                })
                .collect(),
        },
        GuideData::Tree { tree } => DisplayModel {
            entries: tree::parse(tree)
                .into_iter()
                .map(|step| {
                    let id = StepId::Line(step.id);
                    DisplayEntry {
                        completed: completed.is_complete(&id),
                        id,
                        level: step.level,
                        blocks: segment(&step.text),
                        title: step.text,
                    }
                })
                .collect(),
            errors: Vec::new(),
        },
    }
}

/// The guide currently on screen together with its completion state.
#[derive(Debug, Clone)]
pub(crate) struct GuideView {
    data: GuideData,
    completed: CompletedSet,
    ids: Vec<StepId>,
}

impl GuideView {
    pub fn new(data: GuideData) -> Self {
        let ids = render(&data, &CompletedSet::default())
            .entries
            .into_iter()
            .map(|e| e.id)
            .collect();
        Self {
            data,
            completed: CompletedSet::default(),
            ids,
        }
    }

    pub fn ids(&self) -> &[StepId] {
        &self.ids
    }

    /// Flip completion of `id`. Ids that are not part of this guide are
    /// ignored; returns the new completion flag.
    pub fn toggle(&mut self, id: &StepId) -> bool {
        if !self.ids.contains(id) {
            return false;
        }
        self.completed = std::mem::take(&mut self.completed).toggle(id);
        self.completed.is_complete(id)
    }

    pub fn display(&self) -> DisplayModel {
        render(&self.data, &self.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::{GuideView, render};
    use crate::guide::completion::CompletedSet;
    use crate::types::{ContentBlock, GuideData, GuideStep, PotentialError, StepId};

    fn install_guide() -> GuideData {
        GuideData::Steps {
            guide: vec![GuideStep {
                step: "Install CLI".into(),
                details: "Run `npm i -g tool`".into(),
            }],
            errors: Vec::new(),
        }
    }

    #[test]
    fn single_step_guide_renders_and_toggles() {
        let mut view = GuideView::new(install_guide());
        let model = view.display();
        assert_eq!(model.entries.len(), 1);
        let entry = &model.entries[0];
        assert_eq!(entry.level, 0);
        assert_eq!(entry.title, "Install CLI");
        assert!(!entry.completed);
        assert_eq!(
            entry.blocks,
            vec![
                ContentBlock::Text("Run ".into()),
                ContentBlock::InlineCode("npm i -g tool".into()),
            ]
        );

        let id = entry.id.clone();
        assert!(view.toggle(&id));
        assert!(view.display().entries[0].completed);
        assert!(!view.toggle(&id));
        assert!(!view.display().entries[0].completed);
    }

    #[test]
    fn tree_guide_carries_levels_and_line_ids() {
        let data = GuideData::Tree {
            tree: "Deploy\n  Run `kubectl apply`\n".into(),
        };
        let model = render(&data, &CompletedSet::default());
        assert_eq!(model.entries.len(), 2);
        assert_eq!(model.entries[1].level, 1);
        assert_eq!(model.entries[1].id, StepId::Line("1-Run `kubectl apply`".into()));
        assert_eq!(
            model.entries[1].blocks,
            vec![
                ContentBlock::Text("Run ".into()),
                ContentBlock::InlineCode("kubectl apply".into()),
            ]
        );
        assert!(model.errors.is_empty());
    }

    #[test]
    fn potential_errors_are_segmented() {
        let data = GuideData::Steps {
            guide: install_guide_steps(),
            errors: vec![PotentialError {
                error: "EACCES".into(),
                solution: "Open **System > Users**".into(),
            }],
        };
        let model = render(&data, &CompletedSet::default());
        assert_eq!(model.errors.len(), 1);
        assert_eq!(
            model.errors[0].blocks[1],
            ContentBlock::Breadcrumb(vec!["System".into(), "Users".into()])
        );
    }

    #[test]
    fn unknown_ids_never_enter_the_completed_set() {
        let mut view = GuideView::new(install_guide());
        assert!(!view.toggle(&StepId::Index(5)));
        assert!(!view.toggle(&StepId::Line("0-Install CLI".into())));
        assert_eq!(view.display().progress(), (0, 1));
        assert!(view.display().entries.iter().all(|e| !e.completed));
    }

    #[test]
    fn new_view_starts_with_nothing_complete() {
        let mut old = GuideView::new(install_guide());
        old.toggle(&StepId::Index(0));
        let fresh = GuideView::new(install_guide());
        assert_eq!(fresh.display().progress(), (0, 1));
        assert_eq!(old.display().progress(), (1, 1));
    }

    fn install_guide_steps() -> Vec<GuideStep> {
        match install_guide() {
            GuideData::Steps { guide, .. } => guide,
            GuideData::Tree { .. } => unreachable!(),
        }
    }
}
