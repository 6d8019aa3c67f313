use crate::agent::pipeline::{GuideOutcome, validate_request};
use crate::guide::render::GuideView;
use crate::types::GuideMode;

/// What the result area currently shows.
pub(crate) enum ResultArea {
    Placeholder,
    Loading,
    Failed(String),
    Guide(GuideView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Input,
    Guide,
}

pub(crate) struct App {
    pub mode: GuideMode,
    pub input: String,
    pub focus: Focus,
    pub result: ResultArea,
    pub selected: usize,
    pub show_errors: bool,
    /// Inline message under the input; cleared on the next edit.
    pub validation: Option<String>,
    pub generating: bool,
    pub spinner_tick: u64,
    pub quit: bool,
}

impl App {
    pub fn new(mode: GuideMode) -> Self {
        Self {
            mode,
            input: String::new(),
            focus: Focus::Input,
            result: ResultArea::Placeholder,
            selected: 0,
            show_errors: false,
            validation: None,
            generating: false,
            spinner_tick: 0,
            quit: false,
        }
    }

    /// Validate the input and switch to the loading state. Returns the
    /// request to send, or `None` when busy or invalid. The previous guide
    /// and its completion state are dropped here.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.generating {
            return None;
        }
        let request = self.input.trim().to_string();
        if let Err(err) = validate_request(&request) {
            self.validation = Some(err.to_string());
            return None;
        }
        self.validation = None;
        self.result = ResultArea::Loading;
        self.selected = 0;
        self.show_errors = false;
        self.generating = true;
        Some(request)
    }

    pub fn finish_submit(&mut self, outcome: GuideOutcome) {
        self.generating = false;
        self.selected = 0;
        self.show_errors = false;
        match outcome {
            GuideOutcome::Ready(data) => {
                self.result = ResultArea::Guide(GuideView::new(data));
                self.focus = Focus::Guide;
            }
            GuideOutcome::Failed(message) => {
                self.result = ResultArea::Failed(message);
                self.focus = Focus::Input;
            }
        }
    }

    pub fn guide(&self) -> Option<&GuideView> {
        match &self.result {
            ResultArea::Guide(view) => Some(view),
            _ => None,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let Some(total) = self.guide().map(|g| g.ids().len()) else {
            return;
        };
        if total == 0 {
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(total - 1);
    }

    /// Toggle the selected step; returns its new completion flag.
    pub fn toggle_selected(&mut self) -> Option<bool> {
        let selected = self.selected;
        let ResultArea::Guide(view) = &mut self.result else {
            return None;
        };
        let id = view.ids().get(selected)?.clone();
        let done = view.toggle(&id);
        tracing::debug!(step = %id, done, "toggled step");
        Some(done)
    }

    pub fn toggle_errors(&mut self) {
        let has_errors = self
            .guide()
            .is_some_and(|g| !g.display().errors.is_empty());
        self.show_errors = has_errors && !self.show_errors;
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if self.guide().is_some() => Focus::Guide,
            _ => Focus::Input,
        };
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.validation = None;
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
        self.validation = None;
    }
}
