use super::model::{CourseInput, CourseLevel, CourseStatus};
use crate::error::ServiceError;

/// Lower-cases, turns whitespace runs into `-`, and strips everything that
/// is not `a-z`, `0-9`, or `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for c in title.trim().chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    slug
}

/// The fields covered by the validation rules, borrowed from whichever
/// payload is being checked.
#[derive(Debug, Clone, Copy)]
pub struct RequiredFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub language: &'a str,
    pub duration: &'a str,
    pub hours: &'a str,
    pub level: &'a str,
    pub price: f64,
    pub original_price: f64,
}

impl<'a> From<&'a CourseInput> for RequiredFields<'a> {
    fn from(input: &'a CourseInput) -> Self {
        Self {
            title: &input.title,
            description: &input.description,
            category: &input.category,
            language: &input.language,
            duration: &input.duration,
            hours: &input.hours,
            level: &input.level,
            price: input.price,
            original_price: input.original_price,
        }
    }
}

/// Checks every rule and reports all violations at once.
pub fn validate(fields: RequiredFields<'_>) -> Result<(), ServiceError> {
    let mut errors = Vec::new();

    let required = [
        (fields.title, "Title is required"),
        (fields.description, "Description is required"),
        (fields.category, "Category is required"),
        (fields.language, "Language is required"),
        (fields.duration, "Duration is required"),
        (fields.hours, "Hours is required"),
    ];
    for (value, message) in required {
        if value.trim().is_empty() {
            errors.push(message.to_string());
        }
    }

    if CourseLevel::parse(fields.level).is_none() {
        errors.push("Level must be one of beginner, intermediate, advanced".to_string());
    }

    errors.extend(price_violations(fields.price, fields.original_price));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

/// Upper bound for either price; keeps stored numbers well inside
/// DynamoDB's 38-digit precision.
pub const MAX_PRICE: f64 = 1_000_000_000.0;

pub fn price_violations(price: f64, original_price: f64) -> Vec<String> {
    let mut errors = Vec::new();
    if price < 0.0 {
        errors.push("Price must be a non-negative number".to_string());
    } else if price > MAX_PRICE {
        errors.push(format!("Price must not exceed {}", MAX_PRICE));
    }
    if original_price < 0.0 {
        errors.push("Original price must be a non-negative number".to_string());
    } else if original_price > MAX_PRICE {
        errors.push(format!("Original price must not exceed {}", MAX_PRICE));
    }
    if original_price > 0.0 && price > original_price {
        errors.push("Price cannot exceed original price".to_string());
    }
    errors
}

pub fn parse_status(value: &str) -> Result<CourseStatus, ServiceError> {
    CourseStatus::parse(value)
        .ok_or_else(|| ServiceError::Validation(vec!["Status must be draft or published".to_string()]))
}

/// Trims text fields and drops blank entries so the stored record never
/// carries whitespace-only values.
pub fn normalize_input(mut input: CourseInput) -> CourseInput {
    for field in [
        &mut input.title,
        &mut input.description,
        &mut input.category,
        &mut input.level,
        &mut input.language,
        &mut input.duration,
        &mut input.hours,
    ] {
        *field = field.trim().to_string();
    }
    input.level = input.level.to_lowercase();

    for field in [
        &mut input.slug,
        &mut input.author,
        &mut input.payment_link,
        &mut input.background_image,
        &mut input.certificate_image,
        &mut input.status,
    ] {
        *field = normalize_optional(field.take());
    }

    for list in [
        &mut input.learning_outcomes,
        &mut input.features,
        &mut input.skills,
        &mut input.requirements,
    ] {
        *list = normalize_list(std::mem::take(list));
    }

    if !input.rating.is_finite() || input.rating < 0.0 {
        input.rating = 0.0;
    }

    input
}

pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn normalize_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RequiredFields<'static> {
        RequiredFields {
            title: "Intro to Go",
            description: "Learn Go",
            category: "Programming",
            language: "English",
            duration: "6 weeks",
            hours: "20",
            level: "beginner",
            price: 50.0,
            original_price: 100.0,
        }
    }

    #[test]
    fn slug_follows_title() {
        assert_eq!(slugify("Intro to Go!"), "intro-to-go");
        assert_eq!(slugify("  Data   Science 101 "), "data-science-101");
        assert_eq!(slugify("C++ & Rust"), "c--rust");
        assert_eq!(slugify("Café Basics"), "caf-basics");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn price_rules() {
        assert!(validate(RequiredFields { price: 100.0, original_price: 50.0, ..valid() }).is_err());
        assert!(validate(RequiredFields { price: 50.0, original_price: 100.0, ..valid() }).is_ok());
        assert!(validate(RequiredFields { price: 0.0, original_price: 0.0, ..valid() }).is_ok());
        assert!(validate(RequiredFields { price: 30.0, original_price: 0.0, ..valid() }).is_ok());
        assert!(validate(RequiredFields { price: -1.0, ..valid() }).is_err());
    }

    #[test]
    fn huge_prices_are_rejected() {
        assert_eq!(
            price_violations(1e300, 1e300),
            vec!["Price must not exceed 1000000000", "Original price must not exceed 1000000000"]
        );
        assert!(price_violations(MAX_PRICE, MAX_PRICE).is_empty());
    }

    #[test]
    fn every_violation_is_reported() {
        let err = validate(RequiredFields {
            title: " ",
            category: "",
            level: "expert",
            price: 200.0,
            ..valid()
        })
        .unwrap_err();

        let ServiceError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors,
            vec![
                "Title is required",
                "Category is required",
                "Level must be one of beginner, intermediate, advanced",
                "Price cannot exceed original price",
            ]
        );
    }

    #[test]
    fn normalization_trims_and_drops_blanks() {
        let input = normalize_input(CourseInput {
            title: "  Rust  ".into(),
            level: " Advanced ".into(),
            payment_link: Some("   ".into()),
            skills: vec![" ownership ".into(), "".into(), "  ".into()],
            rating: f64::NAN,
            ..CourseInput::default()
        });

        assert_eq!(input.title, "Rust");
        assert_eq!(input.level, "advanced");
        assert_eq!(input.payment_link, None);
        assert_eq!(input.skills, vec!["ownership"]);
        assert_eq!(input.rating, 0.0);
    }
}
