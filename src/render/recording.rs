//! In-memory renderer for test harnesses.
//!
//! Records every directive it receives and maintains a model of the
//! surface (text per target, classes per target, visible phase) so tests
//! can assert on the end state rather than on exact directive sequences.

use std::collections::{HashMap, HashSet};

use crate::error::{RenderError, RenderResult};
use crate::phase::Phase;

use super::{Class, Cue, Directive, Renderer, Target};

/// Renderer that records directives and models the resulting surface.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    directives: Vec<Directive>,
    texts: HashMap<Target, String>,
    classes: HashMap<Target, HashSet<Class>>,
    visible_phase: Option<Phase>,
    missing: HashSet<Target>,
    skipped: usize,
}

impl RecordingRenderer {
    /// Creates a renderer that has every target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer lacking the given targets.
    ///
    /// Directives addressed to them fail with `RenderError::MissingTarget`.
    #[must_use]
    pub fn without(targets: impl IntoIterator<Item = Target>) -> Self {
        Self {
            missing: targets.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns all directives received, including rejected ones.
    #[must_use]
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Returns the current text of a target (empty if never written).
    #[must_use]
    pub fn text(&self, target: Target) -> &str {
        self.texts.get(&target).map_or("", String::as_str)
    }

    /// Returns whether a class is currently set on a target.
    #[must_use]
    pub fn has_class(&self, target: Target, class: Class) -> bool {
        self.classes
            .get(&target)
            .is_some_and(|set| set.contains(&class))
    }

    /// Returns whether a target is currently visible (no `Hidden` class).
    #[must_use]
    pub fn is_visible(&self, target: Target) -> bool {
        !self.has_class(target, Class::Hidden)
    }

    /// Returns the most recently shown phase panel.
    #[must_use]
    pub const fn visible_phase(&self) -> Option<Phase> {
        self.visible_phase
    }

    /// Returns the sound cues in the order they were played.
    #[must_use]
    pub fn cues(&self) -> Vec<Cue> {
        self.directives
            .iter()
            .filter_map(|d| match d {
                Directive::Cue(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    /// Returns how many directives were rejected for a missing target.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Counts directives matching a predicate.
    pub fn count(&self, predicate: impl Fn(&Directive) -> bool) -> usize {
        self.directives.iter().filter(|d| predicate(d)).count()
    }
}

impl Renderer for RecordingRenderer {
    fn apply(&mut self, directive: &Directive) -> RenderResult {
        self.directives.push(directive.clone());

        if let Some(target) = directive.target() {
            if self.missing.contains(&target) {
                self.skipped += 1;
                return Err(RenderError::MissingTarget(target));
            }
        }

        match directive {
            Directive::ShowPhase(phase) => self.visible_phase = Some(*phase),
            Directive::ClearText(t) => {
                self.texts.remove(t);
            }
            Directive::NewLine(t) => {
                let text = self.texts.entry(*t).or_default();
                if !text.is_empty() {
                    text.push('\n');
                }
            }
            Directive::AppendChar(t, c) => self.texts.entry(*t).or_default().push(*c),
            Directive::AppendText(t, s) => self.texts.entry(*t).or_default().push_str(s),
            Directive::SetText(t, s) => {
                self.texts.insert(*t, s.clone());
            }
            Directive::AddClass(t, class) => {
                self.classes.entry(*t).or_default().insert(*class);
            }
            Directive::RemoveClass(t, class) => {
                if let Some(set) = self.classes.get_mut(t) {
                    set.remove(class);
                }
            }
            Directive::ToggleClass(t, class) => {
                let set = self.classes.entry(*t).or_default();
                if !set.remove(class) {
                    set.insert(*class);
                }
            }
            Directive::Cue(_) => {}
        }

        Ok(())
    }
}
