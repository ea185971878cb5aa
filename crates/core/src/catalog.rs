//! EcoDev School course catalog.
//!
//! Modules are numbered from 1 and must be taken in order. Each module holds
//! an ordered list of lessons; a lesson may carry a single-question quiz.

use serde::{Deserialize, Serialize};
use crate::id::{LessonIndex, ModuleId};

/// Course difficulty label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// No prior knowledge needed
    Beginner,
    /// Builds on earlier modules
    Intermediate,
    /// Deployment and tooling topics
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

/// A single-question multiple-choice quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Question text
    pub question: String,
    /// Answer choices in display order
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_index: usize,
}

impl Quiz {
    /// Whether `option` is the right answer.
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index
    }

    /// Text of the right answer.
    pub fn correct_answer(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// One lesson of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson heading
    pub title: String,
    /// Check question at the end of the lesson
    pub quiz: Option<Quiz>,
}

/// A course module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    /// 1-based module number
    pub id: ModuleId,

    /// Module heading
    pub title: String,

    /// One-line summary for the course overview
    pub description: String,

    /// Lesson count advertised on the course overview
    pub declared_lessons: u32,

    /// Estimated time to finish, in minutes
    pub duration_minutes: u32,

    /// Difficulty label
    pub difficulty: Difficulty,

    /// Lessons with content; empty means the module is not yet available
    pub lessons: Vec<Lesson>,
}

impl CourseModule {
    /// Number of lessons that must be finished to complete the module.
    pub fn total_lessons(&self) -> usize {
        self.lessons.len()
    }

    /// Whether the module has any lesson content.
    pub fn has_content(&self) -> bool {
        !self.lessons.is_empty()
    }

    /// Lesson at `index`.
    pub fn lesson(&self, index: LessonIndex) -> Option<&Lesson> {
        self.lessons.get(index as usize)
    }

    /// Number of lessons carrying a quiz.
    pub fn quiz_count(&self) -> usize {
        self.lessons.iter().filter(|l| l.quiz.is_some()).count()
    }
}

/// The full course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    modules: Vec<CourseModule>,
}

impl Catalog {
    /// Build a catalog from modules. Modules are kept sorted by id.
    pub fn new(mut modules: Vec<CourseModule>) -> Self {
        modules.sort_by_key(|m| m.id);
        Self { modules }
    }

    /// All modules in order.
    pub fn modules(&self) -> &[CourseModule] {
        &self.modules
    }

    /// Module by id.
    pub fn module(&self, id: ModuleId) -> Option<&CourseModule> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Number of lessons in a module, `None` if the module does not exist.
    pub fn total_lessons(&self, id: ModuleId) -> Option<usize> {
        self.module(id).map(CourseModule::total_lessons)
    }

    /// Iterate over every quiz as `(module, lesson, quiz)`.
    pub fn quizzes(&self) -> impl Iterator<Item = (ModuleId, LessonIndex, &Quiz)> {
        self.modules.iter().flat_map(|m| {
            m.lessons.iter().enumerate().filter_map(move |(i, l)| {
                l.quiz.as_ref().map(|q| (m.id, i as LessonIndex, q))
            })
        })
    }

    /// The EcoDev School course as published.
    pub fn ecodev() -> Self {
        Self::new(vec![
            CourseModule {
                id: 1,
                title: "The Carbon Cost of the Internet".into(),
                description: "Understand how websites and apps generate CO₂ emissions and why it matters.".into(),
                declared_lessons: 4,
                duration_minutes: 20,
                difficulty: Difficulty::Beginner,
                lessons: vec![
                    quiz_lesson(
                        "What is Digital Carbon?",
                        "What percentage of global CO₂ emissions does the internet account for?",
                        &["0.5%", "2%", "10%", "25%"],
                        1,
                    ),
                    quiz_lesson(
                        "How Websites Generate Emissions",
                        "Which of these is NOT a main source of website emissions?",
                        &["Data Transfer", "Server Processing", "Monitor Brightness", "Client-Side Processing"],
                        2,
                    ),
                    quiz_lesson(
                        "Measuring Your Carbon Footprint",
                        "What is the median CO₂ per page view for websites?",
                        &["~0.1g", "~0.5g", "~2g", "~10g"],
                        1,
                    ),
                    lesson("Taking Action: First Steps"),
                ],
            },
            CourseModule {
                id: 2,
                title: "Optimizing Images & Media".into(),
                description: "Learn to compress, lazy-load, and use modern formats like WebP and AVIF.".into(),
                declared_lessons: 5,
                duration_minutes: 30,
                difficulty: Difficulty::Beginner,
                lessons: vec![
                    quiz_lesson(
                        "Why Images Matter for Carbon",
                        "What percentage of page weight do images typically account for?",
                        &["10-20%", "20-30%", "40-60%", "70-90%"],
                        2,
                    ),
                    quiz_lesson(
                        "Modern Image Formats",
                        "Which format offers ~50% compression improvement over JPEG?",
                        &["WebP", "AVIF", "PNG", "GIF"],
                        1,
                    ),
                    quiz_lesson(
                        "Lazy Loading & Responsive Images",
                        "What attribute enables lazy loading on images?",
                        &["defer", "async", "loading=\"lazy\"", "src-lazy"],
                        2,
                    ),
                    quiz_lesson(
                        "Video & Media Optimization",
                        "What can replace autoplay video to save bandwidth?",
                        &["GIF animation", "Poster image with click-to-play", "Higher resolution video", "Multiple video sources"],
                        1,
                    ),
                    lesson("Image CDN & Automation"),
                ],
            },
            CourseModule {
                id: 3,
                title: "Efficient JavaScript & CSS".into(),
                description: "Write lighter code: tree-shaking, code splitting, and reducing bundle size.".into(),
                declared_lessons: 6,
                duration_minutes: 35,
                difficulty: Difficulty::Intermediate,
                lessons: vec![
                    quiz_lesson(
                        "The Cost of JavaScript",
                        "Why is JavaScript more expensive than images per byte?",
                        &["It's downloaded faster", "It must be parsed, compiled, and executed", "Browsers cache it poorly", "It's always larger"],
                        1,
                    ),
                    quiz_lesson(
                        "Tree-Shaking & Dead Code Elimination",
                        "Which import style enables better tree-shaking?",
                        &["import * as lib from 'lib'", "require('lib')", "import { specific } from 'lib'", "import lib from 'lib'"],
                        2,
                    ),
                    quiz_lesson(
                        "Code Splitting & Lazy Loading",
                        "What is a good target for initial JS bundle size?",
                        &["Under 10KB", "Under 100KB", "Under 500KB", "Under 1MB"],
                        1,
                    ),
                    quiz_lesson(
                        "Efficient CSS",
                        "How much CSS can typically be removed by purging?",
                        &["10-20%", "30-50%", "60-70%", "80-95%"],
                        3,
                    ),
                    lesson("Fonts & Third-Party Scripts"),
                    lesson("Build Pipeline Optimization"),
                ],
            },
            CourseModule {
                id: 4,
                title: "Green Hosting & CDN".into(),
                description: "Choose renewable-powered hosting and optimize content delivery.".into(),
                declared_lessons: 4,
                duration_minutes: 25,
                difficulty: Difficulty::Intermediate,
                lessons: vec![
                    quiz_lesson(
                        "What Is Green Hosting?",
                        "How much can switching to a green host reduce your carbon footprint?",
                        &["Up to 10%", "Up to 30%", "Up to 60%", "Up to 90%"],
                        3,
                    ),
                    quiz_lesson(
                        "Content Delivery Networks (CDNs)",
                        "What is the main environmental benefit of a CDN?",
                        &["It stores more data", "It reduces server-to-user distance and energy", "It speeds up code execution", "It replaces databases"],
                        1,
                    ),
                    quiz_lesson(
                        "Server-Side Sustainability",
                        "Which approach wastes zero energy when idle?",
                        &["Dedicated servers", "Virtual machines", "Serverless functions", "Shared hosting"],
                        2,
                    ),
                    quiz_lesson(
                        "Caching Strategies for Sustainability",
                        "What percentage of repeat requests can caching eliminate?",
                        &["10-20%", "30-40%", "60-80%", "90-100%"],
                        2,
                    ),
                ],
            },
            CourseModule {
                id: 5,
                title: "Performance = Sustainability".into(),
                description: "Core Web Vitals, caching, API design, and a final hands-on project.".into(),
                declared_lessons: 7,
                duration_minutes: 40,
                difficulty: Difficulty::Advanced,
                lessons: vec![
                    quiz_lesson(
                        "Core Web Vitals & Carbon",
                        "Which statement is true about Core Web Vitals and carbon?",
                        &["They are unrelated", "Good vitals usually mean lower carbon", "Only LCP matters for carbon", "CLS has no energy impact"],
                        1,
                    ),
                    quiz_lesson(
                        "Rendering Strategies",
                        "Which rendering strategy has the lowest energy cost per request?",
                        &["SSR", "CSR", "SSG", "ISR"],
                        2,
                    ),
                    quiz_lesson(
                        "Sustainable API Design",
                        "What is a sustainable alternative to polling?",
                        &["More frequent polling", "WebSockets", "Larger payloads", "Removing caching"],
                        1,
                    ),
                    quiz_lesson(
                        "Monitoring & Carbon Budgets",
                        "What is a good carbon budget per page view?",
                        &["Max 5g CO₂", "Max 2g CO₂", "Max 0.5g CO₂", "Max 0.1g CO₂"],
                        2,
                    ),
                    lesson("Your Green Development Checklist"),
                    lesson("Final Project: Audit Your Own Site"),
                ],
            },
        ])
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::ecodev()
    }
}

fn lesson(title: &str) -> Lesson {
    Lesson {
        title: title.to_string(),
        quiz: None,
    }
}

fn quiz_lesson(title: &str, question: &str, options: &[&str], correct_index: usize) -> Lesson {
    Lesson {
        title: title.to_string(),
        quiz: Some(Quiz {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_index,
        }),
    }
}
