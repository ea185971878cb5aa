//! Progress tracking service.
//!
//! Holds one learner's module records in memory and writes every change
//! through to the store. A change becomes visible in memory only after the
//! store accepted it.

use std::collections::BTreeMap;
use std::sync::Arc;

use climacode_core::{Catalog, LessonIndex, ModuleId, ModuleProgress, UserId};
use climacode_storage::{Storage, StorageError};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Error type for progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors raised by the progress tracker.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Module id not in the catalog
    #[error("unknown module {0}")]
    UnknownModule(ModuleId),

    /// Module exists but has no lessons yet
    #[error("module {0} has no lesson content")]
    Unavailable(ModuleId),

    /// Lesson index past the end of the module
    #[error("module {module} has {total} lessons, no lesson {lesson}")]
    LessonOutOfRange {
        /// Module addressed
        module: ModuleId,
        /// Requested lesson
        lesson: LessonIndex,
        /// Lessons in the module
        total: usize,
    },

    /// Previous module not finished
    #[error("module {module} is locked until module {requires} is completed")]
    Locked {
        /// Module addressed
        module: ModuleId,
        /// Module to complete first
        requires: ModuleId,
    },

    /// Lesson has no quiz
    #[error("lesson {lesson} of module {module} has no quiz")]
    NoQuiz {
        /// Module addressed
        module: ModuleId,
        /// Lesson without a quiz
        lesson: LessonIndex,
    },

    /// Answer index past the option list
    #[error("quiz has {options} options, no option {option}")]
    OptionOutOfRange {
        /// Chosen option
        option: usize,
        /// Number of options
        options: usize,
    },

    /// The store rejected the write
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Where a learner stands in a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModuleStatus {
    /// Announced but without lessons
    Unavailable,
    /// Previous module not completed
    Locked,
    /// Unlocked, nothing done yet
    NotStarted,
    /// Some lessons done
    InProgress,
    /// Every lesson done
    Completed,
}

impl std::fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleStatus::Unavailable => write!(f, "UNAVAILABLE"),
            ModuleStatus::Locked => write!(f, "LOCKED"),
            ModuleStatus::NotStarted => write!(f, "NOT STARTED"),
            ModuleStatus::InProgress => write!(f, "IN PROGRESS"),
            ModuleStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Result of answering a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    /// Whether the chosen option was right
    pub correct: bool,
    /// Text of the right option
    pub correct_answer: String,
}

/// Course-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    /// Lessons finished across all modules
    pub lessons_completed: usize,
    /// Modules finished
    pub modules_completed: usize,
    /// Modules in the catalog
    pub total_modules: usize,
    /// modules_completed / total_modules in percent
    pub percentage: f32,
}

/// Per-learner progress tracker.
pub struct ProgressTracker<S: Storage> {
    storage: Arc<Mutex<S>>,
    catalog: Arc<Catalog>,
    user: UserId,
    progress: BTreeMap<ModuleId, ModuleProgress>,
}

impl<S: Storage> ProgressTracker<S> {
    /// Tracker with no recorded progress.
    pub fn new(storage: Arc<Mutex<S>>, catalog: Arc<Catalog>, user: UserId) -> Self {
        Self {
            storage,
            catalog,
            user,
            progress: BTreeMap::new(),
        }
    }

    /// Tracker primed with everything the store holds for `user`.
    pub async fn load(storage: Arc<Mutex<S>>, catalog: Arc<Catalog>, user: UserId) -> Result<Self> {
        let rows = storage.lock().await.list_progress(&user).await?;
        debug!(user = %user, modules = rows.len(), "progress loaded");

        let mut tracker = Self::new(storage, catalog, user);
        tracker.progress = rows.into_iter().map(|p| (p.module_id, p)).collect();
        Ok(tracker)
    }

    /// Learner this tracker belongs to.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Course the progress is measured against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Record for a module, if any work was saved.
    pub fn progress(&self, module_id: ModuleId) -> Option<&ModuleProgress> {
        self.progress.get(&module_id)
    }

    /// All saved records, by module.
    pub fn progress_map(&self) -> &BTreeMap<ModuleId, ModuleProgress> {
        &self.progress
    }

    /// Mark a lesson finished and re-derive module completion.
    ///
    /// Recording the same lesson twice leaves the set unchanged but still
    /// writes the record.
    pub async fn record_lesson_completion(
        &mut self,
        module_id: ModuleId,
        lesson: LessonIndex,
    ) -> Result<&ModuleProgress> {
        let total = self.check_lesson(module_id, lesson)?;

        let mut next = self.current(module_id);
        let was_completed = next.completed;
        next.completed_lessons.insert(lesson);
        next.completed = next.completed_lessons.len() >= total;

        let became_completed = next.completed && !was_completed;
        self.persist(next).await?;
        if became_completed {
            info!(user = %self.user, module = module_id, "module completed");
        }
        Ok(&self.progress[&module_id])
    }

    /// Module `m` can be visited when `m - 1` is completed; module 1 always.
    pub fn is_unlocked(&self, module_id: ModuleId) -> bool {
        module_id == 1
            || self
                .progress
                .get(&module_id.saturating_sub(1))
                .map_or(false, |p| p.completed)
    }

    /// Whether every lesson of the module is done.
    pub fn is_completed(&self, module_id: ModuleId) -> bool {
        self.progress.get(&module_id).map_or(false, |p| p.completed)
    }

    /// Store a quiz outcome (1 correct, 0 wrong). Completion is unaffected.
    pub async fn record_quiz_answer(
        &mut self,
        module_id: ModuleId,
        lesson: LessonIndex,
        is_correct: bool,
    ) -> Result<&ModuleProgress> {
        self.check_lesson(module_id, lesson)?;

        let mut next = self.current(module_id);
        next.quiz_scores
            .insert(ModuleProgress::quiz_key(module_id, lesson), u8::from(is_correct));
        self.persist(next).await
    }

    /// Grade `option` against the lesson's quiz and record the outcome.
    pub async fn submit_quiz_answer(
        &mut self,
        module_id: ModuleId,
        lesson: LessonIndex,
        option: usize,
    ) -> Result<QuizOutcome> {
        self.check_lesson(module_id, lesson)?;
        let quiz = self
            .catalog
            .module(module_id)
            .and_then(|m| m.lesson(lesson))
            .and_then(|l| l.quiz.clone())
            .ok_or(ProgressError::NoQuiz { module: module_id, lesson })?;

        if option >= quiz.options.len() {
            return Err(ProgressError::OptionOutOfRange {
                option,
                options: quiz.options.len(),
            });
        }

        let correct = quiz.is_correct(option);
        self.record_quiz_answer(module_id, lesson, correct).await?;
        Ok(QuizOutcome {
            correct,
            correct_answer: quiz.correct_answer().unwrap_or_default().to_string(),
        })
    }

    /// Where the learner stands in a module, `None` for unknown modules.
    pub fn module_status(&self, module_id: ModuleId) -> Option<ModuleStatus> {
        let module = self.catalog.module(module_id)?;
        let status = if !module.has_content() {
            ModuleStatus::Unavailable
        } else if self.is_completed(module_id) {
            ModuleStatus::Completed
        } else if !self.is_unlocked(module_id) {
            ModuleStatus::Locked
        } else if self
            .progress
            .get(&module_id)
            .map_or(false, |p| !p.completed_lessons.is_empty())
        {
            ModuleStatus::InProgress
        } else {
            ModuleStatus::NotStarted
        };
        Some(status)
    }

    /// First unfinished lesson of a module, `None` when all are done or the
    /// module is unknown.
    pub fn next_lesson(&self, module_id: ModuleId) -> Option<LessonIndex> {
        let total = self.catalog.total_lessons(module_id)? as LessonIndex;
        let done = self.progress.get(&module_id);
        (0..total).find(|i| done.map_or(true, |p| !p.completed_lessons.contains(i)))
    }

    /// Totals across the course.
    pub fn summary(&self) -> ProgressSummary {
        let lessons_completed = self.progress.values().map(ModuleProgress::lessons_completed).sum();
        let modules_completed = self.progress.values().filter(|p| p.completed).count();
        let total_modules = self.catalog.modules().len();
        let percentage = if total_modules > 0 {
            (modules_completed as f32 / total_modules as f32) * 100.0
        } else {
            0.0
        };

        ProgressSummary {
            lessons_completed,
            modules_completed,
            total_modules,
            percentage,
        }
    }

    /// Validate a (module, lesson) target for mutation; returns the module's
    /// lesson count.
    fn check_lesson(&self, module_id: ModuleId, lesson: LessonIndex) -> Result<usize> {
        let module = self
            .catalog
            .module(module_id)
            .ok_or(ProgressError::UnknownModule(module_id))?;
        if !module.has_content() {
            return Err(ProgressError::Unavailable(module_id));
        }
        let total = module.total_lessons();
        if lesson as usize >= total {
            return Err(ProgressError::LessonOutOfRange {
                module: module_id,
                lesson,
                total,
            });
        }
        if !self.is_unlocked(module_id) {
            return Err(ProgressError::Locked {
                module: module_id,
                requires: module_id.saturating_sub(1),
            });
        }
        Ok(total)
    }

    fn current(&self, module_id: ModuleId) -> ModuleProgress {
        self.progress
            .get(&module_id)
            .cloned()
            .unwrap_or_else(|| ModuleProgress::new(module_id))
    }

    async fn persist(&mut self, next: ModuleProgress) -> Result<&ModuleProgress> {
        self.storage.lock().await.upsert_progress(&self.user, &next).await?;
        debug!(
            user = %self.user,
            module = next.module_id,
            lessons = next.completed_lessons.len(),
            completed = next.completed,
            "progress persisted"
        );

        let module_id = next.module_id;
        self.progress.insert(module_id, next);
        Ok(&self.progress[&module_id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climacode_core::{CourseModule, Difficulty, Lesson, Quiz};
    use climacode_storage::MemoryStorage;

    fn user() -> UserId {
        UserId::new("learner")
    }

    async fn tracker() -> (Arc<Mutex<MemoryStorage>>, ProgressTracker<MemoryStorage>) {
        let storage = Arc::new(Mutex::new(MemoryStorage::new()));
        let tracker = ProgressTracker::load(storage.clone(), Arc::new(Catalog::ecodev()), user())
            .await
            .unwrap();
        (storage, tracker)
    }

    async fn complete_module(tracker: &mut ProgressTracker<MemoryStorage>, module_id: ModuleId) {
        let total = tracker.catalog().total_lessons(module_id).unwrap() as LessonIndex;
        for lesson in 0..total {
            tracker.record_lesson_completion(module_id, lesson).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_module_completes_after_last_distinct_lesson() {
        let (_, mut tracker) = tracker().await;
        assert_eq!(tracker.catalog().total_lessons(1), Some(4));

        for lesson in 0..3 {
            let progress = tracker.record_lesson_completion(1, lesson).await.unwrap();
            assert!(!progress.completed);
        }
        // Re-recording does not count twice
        assert!(!tracker.record_lesson_completion(1, 2).await.unwrap().completed);

        let progress = tracker.record_lesson_completion(1, 3).await.unwrap();
        assert!(progress.completed);
        assert_eq!(progress.completed_lessons.len(), 4);
    }

    #[tokio::test]
    async fn test_completion_order_does_not_matter() {
        let (_, mut tracker) = tracker().await;
        for lesson in [3, 1, 0] {
            tracker.record_lesson_completion(1, lesson).await.unwrap();
        }
        assert!(!tracker.is_completed(1));
        tracker.record_lesson_completion(1, 2).await.unwrap();
        assert!(tracker.is_completed(1));
    }

    #[tokio::test]
    async fn test_record_lesson_is_idempotent_and_still_persists() {
        let (storage, mut tracker) = tracker().await;
        tracker.record_lesson_completion(1, 0).await.unwrap();
        let once = tracker.progress(1).unwrap().completed_lessons.clone();

        // Wipe the stored copy to prove the second call writes again
        storage.lock().await.upsert_progress(&user(), &ModuleProgress::new(1)).await.unwrap();
        tracker.record_lesson_completion(1, 0).await.unwrap();

        assert_eq!(tracker.progress(1).unwrap().completed_lessons, once);
        let stored = storage.lock().await.load_progress(&user(), 1).await.unwrap().unwrap();
        assert_eq!(stored.completed_lessons, once);
    }

    #[tokio::test]
    async fn test_unlock_follows_previous_module() {
        let (_, mut tracker) = tracker().await;
        assert!(tracker.is_unlocked(1));
        assert!(!tracker.is_unlocked(2));

        complete_module(&mut tracker, 1).await;
        assert!(tracker.is_unlocked(2));
        assert!(!tracker.is_unlocked(3));
    }

    #[tokio::test]
    async fn test_locked_module_rejects_mutation() {
        let (_, mut tracker) = tracker().await;
        let err = tracker.record_lesson_completion(2, 0).await.unwrap_err();
        assert!(matches!(err, ProgressError::Locked { module: 2, requires: 1 }));
        assert!(tracker.progress(2).is_none());
        assert_eq!(err.to_string(), "module 2 is locked until module 1 is completed");
    }

    #[tokio::test]
    async fn test_invalid_targets_rejected() {
        let (_, mut tracker) = tracker().await;
        assert!(matches!(
            tracker.record_lesson_completion(9, 0).await,
            Err(ProgressError::UnknownModule(9))
        ));
        assert!(matches!(
            tracker.record_lesson_completion(1, 4).await,
            Err(ProgressError::LessonOutOfRange { total: 4, .. })
        ));
        assert!(tracker.progress_map().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_state_unchanged() {
        let (storage, mut tracker) = tracker().await;
        tracker.record_lesson_completion(1, 0).await.unwrap();
        let before = tracker.progress(1).cloned();

        storage.lock().await.set_read_only(true);
        let err = tracker.record_lesson_completion(1, 1).await.unwrap_err();
        assert!(matches!(err, ProgressError::Storage(StorageError::Rejected(_))));
        assert_eq!(tracker.progress(1).cloned(), before);

        let err = tracker.record_quiz_answer(1, 0, true).await.unwrap_err();
        assert!(matches!(err, ProgressError::Storage(_)));
        assert!(tracker.progress(1).unwrap().quiz_scores.is_empty());

        // Caller may retry once the store recovers
        storage.lock().await.set_read_only(false);
        tracker.record_lesson_completion(1, 1).await.unwrap();
        assert_eq!(tracker.progress(1).unwrap().completed_lessons.len(), 2);
    }

    #[tokio::test]
    async fn test_quiz_answer_does_not_complete_module() {
        let (_, mut tracker) = tracker().await;
        let progress = tracker.record_quiz_answer(1, 0, true).await.unwrap();
        assert_eq!(progress.quiz_scores.get("1-0"), Some(&1));
        assert!(progress.completed_lessons.is_empty());
        assert!(!progress.completed);

        let progress = tracker.record_quiz_answer(1, 0, false).await.unwrap();
        assert_eq!(progress.quiz_scores.get("1-0"), Some(&0));
    }

    #[tokio::test]
    async fn test_submit_quiz_answer_grades_against_catalog() {
        let (_, mut tracker) = tracker().await;

        let outcome = tracker.submit_quiz_answer(1, 0, 1).await.unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.correct_answer, "2%");

        let outcome = tracker.submit_quiz_answer(1, 1, 0).await.unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_answer, "Monitor Brightness");

        assert!(matches!(
            tracker.submit_quiz_answer(1, 3, 0).await,
            Err(ProgressError::NoQuiz { module: 1, lesson: 3 })
        ));
        assert!(matches!(
            tracker.submit_quiz_answer(1, 0, 7).await,
            Err(ProgressError::OptionOutOfRange { option: 7, options: 4 })
        ));
    }

    #[tokio::test]
    async fn test_load_restores_saved_progress() {
        let (storage, mut tracker) = tracker().await;
        complete_module(&mut tracker, 1).await;
        tracker.record_lesson_completion(2, 0).await.unwrap();

        let reloaded = ProgressTracker::load(storage, Arc::new(Catalog::ecodev()), user())
            .await
            .unwrap();
        assert!(reloaded.is_completed(1));
        assert_eq!(reloaded.module_status(2), Some(ModuleStatus::InProgress));
        assert_eq!(reloaded.next_lesson(2), Some(1));
    }

    #[tokio::test]
    async fn test_module_status_states() {
        let catalog = Catalog::new(vec![
            CourseModule {
                id: 1,
                title: "One".into(),
                description: String::new(),
                declared_lessons: 1,
                duration_minutes: 5,
                difficulty: Difficulty::Beginner,
                lessons: vec![Lesson {
                    title: "Only".into(),
                    quiz: Some(Quiz {
                        question: "?".into(),
                        options: vec!["a".into(), "b".into()],
                        correct_index: 0,
                    }),
                }],
            },
            CourseModule {
                id: 2,
                title: "Two".into(),
                description: String::new(),
                declared_lessons: 1,
                duration_minutes: 5,
                difficulty: Difficulty::Beginner,
                lessons: vec![Lesson { title: "Only".into(), quiz: None }],
            },
            CourseModule {
                id: 3,
                title: "Three".into(),
                description: String::new(),
                declared_lessons: 3,
                duration_minutes: 5,
                difficulty: Difficulty::Advanced,
                lessons: Vec::new(),
            },
        ]);
        let storage = Arc::new(Mutex::new(MemoryStorage::new()));
        let mut tracker = ProgressTracker::new(storage, Arc::new(catalog), user());

        assert_eq!(tracker.module_status(1), Some(ModuleStatus::NotStarted));
        assert_eq!(tracker.module_status(2), Some(ModuleStatus::Locked));
        assert_eq!(tracker.module_status(3), Some(ModuleStatus::Unavailable));
        assert_eq!(tracker.module_status(4), None);

        tracker.record_lesson_completion(1, 0).await.unwrap();
        assert_eq!(tracker.module_status(1), Some(ModuleStatus::Completed));
        assert_eq!(tracker.module_status(2), Some(ModuleStatus::NotStarted));

        assert!(matches!(
            tracker.record_lesson_completion(3, 0).await,
            Err(ProgressError::Unavailable(3))
        ));
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let (_, mut tracker) = tracker().await;
        complete_module(&mut tracker, 1).await;
        tracker.record_lesson_completion(2, 0).await.unwrap();

        let summary = tracker.summary();
        assert_eq!(summary.lessons_completed, 5);
        assert_eq!(summary.modules_completed, 1);
        assert_eq!(summary.total_modules, 5);
        assert!((summary.percentage - 20.0).abs() < f32::EPSILON);
        assert_eq!(tracker.next_lesson(1), None);
    }
}
