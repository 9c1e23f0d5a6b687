use super::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" => Some(CourseLevel::Beginner),
            "intermediate" => Some(CourseLevel::Intermediate),
            "advanced" => Some(CourseLevel::Advanced),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
}

impl CourseStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "draft" => Some(CourseStatus::Draft),
            "published" => Some(CourseStatus::Published),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Published => "published",
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseModule {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Highlight {
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramFor {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Tool {
    pub name: String,
    pub icon: Option<String>,
}

/// The "tools you will use" block of a course page.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Tools {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "lenient::list")]
    pub items: Vec<Tool>,
}

/// Course domain model as returned by every read.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub author: Option<String>,
    pub level: CourseLevel,
    pub language: String,
    pub duration: String,
    pub hours: String,
    pub price: f64,
    pub original_price: f64,
    pub payment_link: Option<String>,
    pub background_image: Option<String>,
    pub certificate_image: Option<String>,
    pub status: CourseStatus,
    pub rating: f64,
    pub total_ratings: u64,
    pub enrolled_students: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub learning_outcomes: Vec<String>,
    pub features: Vec<String>,
    pub skills: Vec<String>,
    pub requirements: Vec<String>,
    pub modules: Vec<CourseModule>,
    pub highlights: Vec<Highlight>,
    pub projects: Vec<Project>,
    pub program_for: Vec<ProgramFor>,
    pub tools: Tools,
}

/// Full create payload. Every field tolerates absence or junk; the
/// validation rules decide what is acceptable.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseInput {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub category: String,
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub level: String,
    #[serde(deserialize_with = "lenient::text")]
    pub language: String,
    #[serde(deserialize_with = "lenient::text")]
    pub duration: String,
    #[serde(deserialize_with = "lenient::text")]
    pub hours: String,
    #[serde(deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub original_price: f64,
    pub payment_link: Option<String>,
    pub background_image: Option<String>,
    pub certificate_image: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub rating: f64,
    #[serde(deserialize_with = "lenient::count")]
    pub total_ratings: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub enrolled_students: u64,
    #[serde(deserialize_with = "lenient::string_list")]
    pub learning_outcomes: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub features: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub requirements: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub modules: Vec<CourseModule>,
    #[serde(deserialize_with = "lenient::list")]
    pub highlights: Vec<Highlight>,
    #[serde(deserialize_with = "lenient::list")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "lenient::list")]
    pub program_for: Vec<ProgramFor>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub tools: Tools,
}

impl From<Course> for CourseInput {
    fn from(course: Course) -> Self {
        Self {
            title: course.title,
            slug: Some(course.slug),
            description: course.description,
            category: course.category,
            author: course.author,
            level: course.level.as_str().to_string(),
            language: course.language,
            duration: course.duration,
            hours: course.hours,
            price: course.price,
            original_price: course.original_price,
            payment_link: course.payment_link,
            background_image: course.background_image,
            certificate_image: course.certificate_image,
            status: Some(course.status.as_str().to_string()),
            rating: course.rating,
            total_ratings: course.total_ratings,
            enrolled_students: course.enrolled_students,
            learning_outcomes: course.learning_outcomes,
            features: course.features,
            skills: course.skills,
            requirements: course.requirements,
            modules: course.modules,
            highlights: course.highlights,
            projects: course.projects,
            program_for: course.program_for,
            tools: course.tools,
        }
    }
}

/// Partial update payload: `Some` means the caller sent the field.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CoursePatch {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub level: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub language: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub hours: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub original_price: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub payment_link: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub background_image: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub certificate_image: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_count")]
    pub total_ratings: Option<u64>,
    #[serde(deserialize_with = "lenient::opt_count")]
    pub enrolled_students: Option<u64>,
    #[serde(deserialize_with = "lenient::opt_string_list")]
    pub learning_outcomes: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::opt_string_list")]
    pub features: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::opt_string_list")]
    pub skills: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::opt_string_list")]
    pub requirements: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::opt_list")]
    pub modules: Option<Vec<CourseModule>>,
    #[serde(deserialize_with = "lenient::opt_list")]
    pub highlights: Option<Vec<Highlight>>,
    #[serde(deserialize_with = "lenient::opt_list")]
    pub projects: Option<Vec<Project>>,
    #[serde(deserialize_with = "lenient::opt_list")]
    pub program_for: Option<Vec<ProgramFor>>,
    #[serde(deserialize_with = "lenient::opt_or_default")]
    pub tools: Option<Tools>,
}

impl CoursePatch {
    /// Whether the patch touches a field whose change re-triggers the
    /// required-field rules.
    pub fn touches_required(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.category.is_some()
    }

    pub fn with_status(status: CourseStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
            ..Self::default()
        }
    }
}

/// List filters. Status and category are pushed to the store; search and
/// limit are applied to the fetched set.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct BulkDeletePayload {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DuplicatePayload {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub total_courses: u64,
    pub published_courses: u64,
    pub draft_courses: u64,
    pub total_students: u64,
    pub total_revenue: f64,
    pub category_counts: BTreeMap<String, u64>,
    pub level_counts: BTreeMap<String, u64>,
}
