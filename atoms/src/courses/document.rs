use super::model::{Course, CourseLevel, CoursePatch, CourseStatus};
use super::validate::{normalize_list, normalize_optional};
use crate::store::Document;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

// Attribute names as stored. They mirror the JSON field names so documents
// written by older dashboard builds stay readable.
pub const ID: &str = "_id";
pub const SLUG: &str = "slug";
pub const STATUS: &str = "status";
pub const CATEGORY: &str = "category";
pub const BACKGROUND_IMAGE: &str = "backgroundImage";
pub const CERTIFICATE_IMAGE: &str = "certificateImage";

fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

fn n(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// Largest magnitude written for a decimal attribute.
const MAX_DECIMAL: f64 = 1e15;

/// Decimal attribute DynamoDB accepts: non-finite and vanishing values
/// become 0 and magnitudes are clamped, so the plain rendering never needs
/// more than 38 significant digits.
fn decimal(value: f64) -> AttributeValue {
    if !value.is_finite() || value.abs() < 1e-9 {
        return n(0);
    }
    n(value.clamp(-MAX_DECIMAL, MAX_DECIMAL))
}

fn list(items: &[String]) -> AttributeValue {
    AttributeValue::L(items.iter().map(|i| s(i.as_str())).collect())
}

fn json<T: Serialize>(value: &T) -> AttributeValue {
    s(serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()))
}

fn timestamp(value: &DateTime<Utc>) -> AttributeValue {
    s(value.to_rfc3339())
}

fn get_s(item: &Document, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn get_opt_s(item: &Document, name: &str) -> Option<String> {
    normalize_optional(item.get(name).and_then(|v| v.as_s().ok()).cloned())
}

fn get_f64(item: &Document, name: &str) -> f64 {
    item.get(name)
        .and_then(|v| v.as_n().ok().or_else(|| v.as_s().ok()))
        .and_then(|n| n.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn get_u64(item: &Document, name: &str) -> u64 {
    let n = get_f64(item, name);
    if n > 0.0 {
        n.floor() as u64
    } else {
        0
    }
}

fn get_list(item: &Document, name: &str) -> Vec<String> {
    item.get(name)
        .and_then(|v| v.as_l().ok())
        .map(|l| l.iter().filter_map(|v| v.as_s().ok()).cloned().collect())
        .unwrap_or_default()
}

fn get_json<T: DeserializeOwned + Default>(item: &Document, name: &str) -> T {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

fn get_time(item: &Document, name: &str) -> DateTime<Utc> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

fn put_opt(doc: &mut Document, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        doc.insert(name.to_string(), s(value.as_str()));
    }
}

/// Stored attributes of a whole course.
pub fn to_document(course: &Course) -> Document {
    let mut doc = Document::new();
    doc.insert(ID.to_string(), s(course.id.as_str()));
    doc.insert("title".to_string(), s(course.title.as_str()));
    doc.insert(SLUG.to_string(), s(course.slug.as_str()));
    doc.insert("description".to_string(), s(course.description.as_str()));
    doc.insert(CATEGORY.to_string(), s(course.category.as_str()));
    put_opt(&mut doc, "author", &course.author);
    doc.insert("level".to_string(), s(course.level.as_str()));
    doc.insert("language".to_string(), s(course.language.as_str()));
    doc.insert("duration".to_string(), s(course.duration.as_str()));
    doc.insert("hours".to_string(), s(course.hours.as_str()));
    doc.insert("price".to_string(), decimal(course.price));
    doc.insert("originalPrice".to_string(), decimal(course.original_price));
    put_opt(&mut doc, "paymentLink", &course.payment_link);
    put_opt(&mut doc, BACKGROUND_IMAGE, &course.background_image);
    put_opt(&mut doc, CERTIFICATE_IMAGE, &course.certificate_image);
    doc.insert(STATUS.to_string(), s(course.status.as_str()));
    doc.insert("rating".to_string(), decimal(course.rating));
    doc.insert("totalRatings".to_string(), n(course.total_ratings));
    doc.insert("enrolledStudents".to_string(), n(course.enrolled_students));
    doc.insert("createdAt".to_string(), timestamp(&course.created_at));
    doc.insert("updatedAt".to_string(), timestamp(&course.updated_at));
    doc.insert("learningOutcomes".to_string(), list(&course.learning_outcomes));
    doc.insert("features".to_string(), list(&course.features));
    doc.insert("skills".to_string(), list(&course.skills));
    doc.insert("requirements".to_string(), list(&course.requirements));
    doc.insert("modules".to_string(), json(&course.modules));
    doc.insert("highlights".to_string(), json(&course.highlights));
    doc.insert("projects".to_string(), json(&course.projects));
    doc.insert("programFor".to_string(), json(&course.program_for));
    doc.insert("tools".to_string(), json(&course.tools));
    doc
}

/// Reads a stored document back into a course. Absent or malformed
/// attributes fall back to their defaults; lists are never absent.
pub fn from_document(item: &Document) -> Course {
    Course {
        id: get_s(item, ID),
        title: get_s(item, "title"),
        slug: get_s(item, SLUG),
        description: get_s(item, "description"),
        category: get_s(item, CATEGORY),
        author: get_opt_s(item, "author"),
        level: CourseLevel::parse(&get_s(item, "level")).unwrap_or_default(),
        language: get_s(item, "language"),
        duration: get_s(item, "duration"),
        hours: get_s(item, "hours"),
        price: get_f64(item, "price"),
        original_price: get_f64(item, "originalPrice"),
        payment_link: get_opt_s(item, "paymentLink"),
        background_image: get_opt_s(item, BACKGROUND_IMAGE),
        certificate_image: get_opt_s(item, CERTIFICATE_IMAGE),
        status: CourseStatus::parse(&get_s(item, STATUS)).unwrap_or_default(),
        rating: get_f64(item, "rating"),
        total_ratings: get_u64(item, "totalRatings"),
        enrolled_students: get_u64(item, "enrolledStudents"),
        created_at: get_time(item, "createdAt"),
        updated_at: get_time(item, "updatedAt"),
        learning_outcomes: get_list(item, "learningOutcomes"),
        features: get_list(item, "features"),
        skills: get_list(item, "skills"),
        requirements: get_list(item, "requirements"),
        modules: get_json(item, "modules"),
        highlights: get_json(item, "highlights"),
        projects: get_json(item, "projects"),
        program_for: get_json(item, "programFor"),
        tools: get_json(item, "tools"),
    }
}

/// Attributes to overwrite for a partial update. Enumerated values are
/// expected to be checked already; anything unparseable is skipped.
pub fn patch_document(patch: &CoursePatch, updated_at: &DateTime<Utc>) -> Document {
    let mut doc = Document::new();

    let texts = [
        ("title", &patch.title),
        ("description", &patch.description),
        (CATEGORY, &patch.category),
        ("language", &patch.language),
        ("duration", &patch.duration),
        ("hours", &patch.hours),
    ];
    for (name, value) in texts {
        if let Some(value) = value {
            doc.insert(name.to_string(), s(value.trim()));
        }
    }

    // Cleared optional fields are stored as "" and read back as None.
    let optionals = [
        ("author", &patch.author),
        ("paymentLink", &patch.payment_link),
        (BACKGROUND_IMAGE, &patch.background_image),
        (CERTIFICATE_IMAGE, &patch.certificate_image),
    ];
    for (name, value) in optionals {
        if let Some(value) = value {
            doc.insert(name.to_string(), s(value.trim()));
        }
    }

    if let Some(title) = &patch.title {
        doc.insert(SLUG.to_string(), s(super::validate::slugify(title)));
    }
    if let Some(level) = patch.level.as_deref().and_then(CourseLevel::parse) {
        doc.insert("level".to_string(), s(level.as_str()));
    }
    if let Some(status) = patch.status.as_deref().and_then(CourseStatus::parse) {
        doc.insert(STATUS.to_string(), s(status.as_str()));
    }

    if let Some(price) = patch.price {
        doc.insert("price".to_string(), decimal(price));
    }
    if let Some(original_price) = patch.original_price {
        doc.insert("originalPrice".to_string(), decimal(original_price));
    }
    if let Some(rating) = patch.rating {
        doc.insert("rating".to_string(), decimal(if rating > 0.0 { rating } else { 0.0 }));
    }
    if let Some(total_ratings) = patch.total_ratings {
        doc.insert("totalRatings".to_string(), n(total_ratings));
    }
    if let Some(enrolled_students) = patch.enrolled_students {
        doc.insert("enrolledStudents".to_string(), n(enrolled_students));
    }

    let lists = [
        ("learningOutcomes", &patch.learning_outcomes),
        ("features", &patch.features),
        ("skills", &patch.skills),
        ("requirements", &patch.requirements),
    ];
    for (name, value) in lists {
        if let Some(items) = value {
            doc.insert(name.to_string(), list(&normalize_list(items.clone())));
        }
    }

    if let Some(modules) = &patch.modules {
        doc.insert("modules".to_string(), json(modules));
    }
    if let Some(highlights) = &patch.highlights {
        doc.insert("highlights".to_string(), json(highlights));
    }
    if let Some(projects) = &patch.projects {
        doc.insert("projects".to_string(), json(projects));
    }
    if let Some(program_for) = &patch.program_for {
        doc.insert("programFor".to_string(), json(program_for));
    }
    if let Some(tools) = &patch.tools {
        doc.insert("tools".to_string(), json(tools));
    }

    doc.insert("updatedAt".to_string(), timestamp(updated_at));
    doc
}
