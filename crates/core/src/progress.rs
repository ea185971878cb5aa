//! Module progress model - per-learner state for one course module.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use crate::id::{LessonIndex, ModuleId};

/// Progress of one learner through one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    /// Module this record belongs to
    pub module_id: ModuleId,

    /// Lessons finished so far
    #[serde(default)]
    pub completed_lessons: BTreeSet<LessonIndex>,

    /// Quiz outcomes keyed by `"<module>-<lesson>"`, 1 = correct
    #[serde(default)]
    pub quiz_scores: BTreeMap<String, u8>,

    /// All lessons of the module are finished
    #[serde(default)]
    pub completed: bool,
}

impl ModuleProgress {
    /// Fresh record with nothing done.
    pub fn new(module_id: ModuleId) -> Self {
        Self {
            module_id,
            completed_lessons: BTreeSet::new(),
            quiz_scores: BTreeMap::new(),
            completed: false,
        }
    }

    /// Key used in `quiz_scores` for a lesson of this module.
    pub fn quiz_key(module_id: ModuleId, lesson: LessonIndex) -> String {
        format!("{}-{}", module_id, lesson)
    }

    /// Stored quiz score for a lesson, if answered.
    pub fn quiz_score(&self, lesson: LessonIndex) -> Option<u8> {
        self.quiz_scores
            .get(&Self::quiz_key(self.module_id, lesson))
            .copied()
    }

    /// Number of finished lessons.
    pub fn lessons_completed(&self) -> usize {
        self.completed_lessons.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_key_format() {
        assert_eq!(ModuleProgress::quiz_key(3, 0), "3-0");
    }

    #[test]
    fn test_missing_fields_default_when_deserializing() {
        let progress: ModuleProgress = serde_json::from_str(r#"{"module_id": 2}"#).unwrap();
        assert_eq!(progress, ModuleProgress::new(2));
    }

    #[test]
    fn test_quiz_score_lookup() {
        let mut progress = ModuleProgress::new(4);
        progress.quiz_scores.insert("4-1".to_string(), 1);
        assert_eq!(progress.quiz_score(1), Some(1));
        assert_eq!(progress.quiz_score(0), None);
    }
}
