use super::document::{self, from_document, patch_document, to_document};
use super::model::{Course, CourseFilter, CourseInput, CourseLevel, CoursePatch, CourseStats, CourseStatus};
use super::validate::{self, normalize_input, parse_status, price_violations, slugify, RequiredFields};
use crate::error::ServiceError;
use crate::media;
use crate::store::{DocumentStore, FieldFilter, ObjectStore, StoredDocument};

/// Collection holding course documents.
pub const COURSES: &str = "course";

/// Look up the stored document whose `_id` field equals `id`.
async fn find_by_id<S: DocumentStore>(store: &S, id: &str) -> Result<StoredDocument, ServiceError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ServiceError::not_found("Course"));
    }

    store
        .find(COURSES, &[FieldFilter::eq(document::ID, id)])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::not_found("Course"))
}

/// Create a new course: normalize, validate, assign identifiers and
/// timestamps, write once.
pub async fn create_course<S: DocumentStore>(store: &S, input: CourseInput) -> Result<Course, ServiceError> {
    let input = normalize_input(input);
    validate::validate(RequiredFields::from(&input))?;

    let status = match input.status.as_deref() {
        Some(status) => parse_status(status)?,
        None => CourseStatus::Draft,
    };
    let slug = match input.slug.as_deref().map(slugify).filter(|s| !s.is_empty()) {
        Some(slug) => slug,
        None => slugify(&input.title),
    };

    let now = chrono::Utc::now();
    let course = Course {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title,
        slug,
        description: input.description,
        category: input.category,
        author: input.author,
        level: CourseLevel::parse(&input.level).unwrap_or_default(),
        language: input.language,
        duration: input.duration,
        hours: input.hours,
        price: input.price,
        original_price: input.original_price,
        payment_link: input.payment_link,
        background_image: input.background_image,
        certificate_image: input.certificate_image,
        status,
        rating: input.rating,
        total_ratings: input.total_ratings,
        enrolled_students: input.enrolled_students,
        created_at: now,
        updated_at: now,
        learning_outcomes: input.learning_outcomes,
        features: input.features,
        skills: input.skills,
        requirements: input.requirements,
        modules: input.modules,
        highlights: input.highlights,
        projects: input.projects,
        program_for: input.program_for,
        tools: input.tools,
    };

    // The storage key is deliberately unrelated to the public identifier.
    let storage_key = uuid::Uuid::new_v4().to_string();
    store.insert(COURSES, &storage_key, to_document(&course)).await?;

    tracing::info!("Created course {} ({})", course.id, course.slug);
    Ok(course)
}

/// List courses, newest first.
pub async fn list_courses<S: DocumentStore>(store: &S, filter: &CourseFilter) -> Result<Vec<Course>, ServiceError> {
    let mut filters = Vec::new();
    if let Some(status) = filter.status {
        filters.push(FieldFilter::eq(document::STATUS, status.as_str()));
    }
    if let Some(category) = filter.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        filters.push(FieldFilter::eq(document::CATEGORY, category));
    }

    let mut courses: Vec<Course> = store
        .find(COURSES, &filters)
        .await?
        .iter()
        .map(|doc| from_document(&doc.fields))
        .collect();

    courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    // Substring search over the fetched set; fine for a catalog of this size.
    if let Some(term) = filter.search.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
        courses.retain(|course| matches_search(course, &term));
    }

    if let Some(limit) = filter.limit {
        courses.truncate(limit);
    }

    Ok(courses)
}

fn matches_search(course: &Course, term: &str) -> bool {
    [
        Some(course.title.as_str()),
        Some(course.category.as_str()),
        Some(course.description.as_str()),
        course.author.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(term))
}

/// Get a course by its identifier.
pub async fn get_course<S: DocumentStore>(store: &S, id: &str) -> Result<Course, ServiceError> {
    let doc = find_by_id(store, id).await?;
    Ok(from_document(&doc.fields))
}

/// Get a course by its slug.
pub async fn get_course_by_slug<S: DocumentStore>(store: &S, slug: &str) -> Result<Course, ServiceError> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(ServiceError::not_found("Course"));
    }

    store
        .find(COURSES, &[FieldFilter::eq(document::SLUG, slug)])
        .await?
        .first()
        .map(|doc| from_document(&doc.fields))
        .ok_or_else(|| ServiceError::not_found("Course"))
}

/// Apply a partial update and return the fresh record.
pub async fn update_course<S: DocumentStore>(
    store: &S,
    id: &str,
    patch: CoursePatch,
) -> Result<Course, ServiceError> {
    let existing = find_by_id(store, id).await?;

    let mut errors = Vec::new();
    if let Some(level) = patch.level.as_deref() {
        if CourseLevel::parse(level).is_none() {
            errors.push("Level must be one of beginner, intermediate, advanced".to_string());
        }
    }
    if let Some(status) = patch.status.as_deref() {
        if CourseStatus::parse(status).is_none() {
            errors.push("Status must be draft or published".to_string());
        }
    }

    if patch.touches_required() {
        // Fields missing from the patch stand in as valid placeholders so an
        // edit of the title alone is not rejected for unrelated fields.
        let fields = RequiredFields {
            title: patch.title.as_deref().unwrap_or("placeholder"),
            description: patch.description.as_deref().unwrap_or("placeholder"),
            category: patch.category.as_deref().unwrap_or("placeholder"),
            language: patch.language.as_deref().unwrap_or("placeholder"),
            duration: patch.duration.as_deref().unwrap_or("placeholder"),
            hours: patch.hours.as_deref().unwrap_or("placeholder"),
            level: patch.level.as_deref().unwrap_or("beginner"),
            price: 0.0,
            original_price: 0.0,
        };
        if let Err(ServiceError::Validation(found)) = validate::validate(fields) {
            for message in found {
                if !errors.contains(&message) {
                    errors.push(message);
                }
            }
        }
    }

    // Prices are checked as a pair against whatever is already stored.
    if patch.price.is_some() || patch.original_price.is_some() {
        let current = from_document(&existing.fields);
        errors.extend(price_violations(
            patch.price.unwrap_or(current.price),
            patch.original_price.unwrap_or(current.original_price),
        ));
    }

    if !errors.is_empty() {
        return Err(ServiceError::Validation(errors));
    }

    let fields = patch_document(&patch, &chrono::Utc::now());
    store.update(COURSES, &existing.key, fields.clone()).await?;
    tracing::info!("Updated course {} ({} fields)", id, fields.len());

    match get_course(store, id).await {
        Ok(course) => Ok(course),
        Err(e) => {
            // The write went through; answer with what we know was stored.
            tracing::warn!("Re-reading course {} after update failed: {}", id, e);
            let mut merged = existing.fields;
            merged.extend(fields);
            Ok(from_document(&merged))
        }
    }
}

/// Change only the publication status.
pub async fn update_course_status<S: DocumentStore>(
    store: &S,
    id: &str,
    status: &str,
) -> Result<Course, ServiceError> {
    let status = parse_status(status)?;
    update_course(store, id, CoursePatch::with_status(status)).await
}

/// Whether a course outside `deleting` still points at `url`. Duplicates
/// share image URLs with their source.
async fn image_in_use<S: DocumentStore>(store: &S, url: &str, deleting: &[&str]) -> Result<bool, ServiceError> {
    for field in [document::BACKGROUND_IMAGE, document::CERTIFICATE_IMAGE] {
        let users = store.find(COURSES, &[FieldFilter::eq(field, url)]).await?;
        let kept = users.iter().any(|doc| {
            let id = doc.fields.get(document::ID).and_then(|v| v.as_s().ok());
            !id.is_some_and(|id| deleting.contains(&id.as_str()))
        });
        if kept {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Best-effort removal of the images a course points at. Images still used
/// by a course that survives the deletion are left alone.
async fn delete_course_images<S: DocumentStore, O: ObjectStore>(
    store: &S,
    objects: &O,
    course: &Course,
    deleting: &[&str],
) {
    let images = [course.background_image.as_deref(), course.certificate_image.as_deref()];
    for url in images.into_iter().flatten() {
        match image_in_use(store, url, deleting).await {
            Ok(true) => {
                tracing::info!("Keeping image {} of course {}: still referenced", url, course.id);
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Could not check references to image {}, keeping it: {}", url, e);
                continue;
            }
        }
        if let Err(e) = media::delete_image(objects, url).await {
            tracing::warn!("Failed to delete image {} of course {}: {}", url, course.id, e);
        }
    }
}

/// Delete a course and, best effort, its stored images.
pub async fn delete_course<S: DocumentStore, O: ObjectStore>(
    store: &S,
    objects: &O,
    id: &str,
) -> Result<(), ServiceError> {
    let existing = find_by_id(store, id).await?;
    let course = from_document(&existing.fields);

    delete_course_images(store, objects, &course, &[course.id.as_str()]).await;

    store.delete(COURSES, &existing.key).await?;
    tracing::info!("Deleted course {}", course.id);
    Ok(())
}

/// Delete every course in `ids` that exists. Returns how many were removed.
pub async fn delete_courses<S: DocumentStore, O: ObjectStore>(
    store: &S,
    objects: &O,
    ids: &[String],
) -> Result<usize, ServiceError> {
    let mut keys = Vec::new();
    let mut courses = Vec::new();

    for id in ids {
        match find_by_id(store, id).await {
            Ok(doc) => {
                if !keys.contains(&doc.key) {
                    courses.push(from_document(&doc.fields));
                    keys.push(doc.key);
                }
            }
            Err(ServiceError::NotFound(_)) => {
                tracing::warn!("Skipping unknown course {} in bulk delete", id);
            }
            Err(e) => return Err(e),
        }
    }

    if keys.is_empty() {
        return Err(ServiceError::NotFound("No courses found to delete".to_string()));
    }

    let deleting: Vec<&str> = courses.iter().map(|c| c.id.as_str()).collect();
    for course in &courses {
        delete_course_images(store, objects, course, &deleting).await;
    }

    store.delete_many(COURSES, &keys).await?;
    tracing::info!("Bulk deleted {} of {} requested courses", keys.len(), ids.len());
    Ok(keys.len())
}

/// Copy a course into a new draft with fresh counters.
pub async fn duplicate_course<S: DocumentStore>(
    store: &S,
    id: &str,
    new_title: Option<String>,
) -> Result<Course, ServiceError> {
    let source = get_course(store, id).await?;

    let title = new_title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("{} (Copy)", source.title));

    let mut input = CourseInput::from(source);
    input.slug = Some(slugify(&title));
    input.title = title;
    input.status = Some(CourseStatus::Draft.as_str().to_string());
    input.rating = 0.0;
    input.total_ratings = 0;
    input.enrolled_students = 0;

    create_course(store, input).await
}

/// Aggregate figures for the dashboard.
pub async fn course_stats<S: DocumentStore>(store: &S) -> Result<CourseStats, ServiceError> {
    let courses = list_courses(store, &CourseFilter::default()).await?;

    Ok(courses.iter().fold(CourseStats::default(), |mut stats, course| {
        stats.total_courses += 1;
        match course.status {
            CourseStatus::Published => stats.published_courses += 1,
            CourseStatus::Draft => stats.draft_courses += 1,
        }
        // Counts come from loosely typed dashboard input and can be huge.
        stats.total_students = stats.total_students.saturating_add(course.enrolled_students);
        stats.total_revenue = (stats.total_revenue + course.price * course.enrolled_students as f64).min(f64::MAX);
        *stats.category_counts.entry(course.category.clone()).or_default() += 1;
        *stats.level_counts.entry(course.level.as_str().to_string()).or_default() += 1;
        stats
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courses::model::{CourseModule, Tool, Tools};
    use crate::store::{Document, MemoryDocumentStore, MemoryObjectStore, ObjectStore, StoreError, StoreErrorCode};
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves the first `healthy_finds` lookups, then fails every later one.
    struct FailingReads {
        inner: MemoryDocumentStore,
        finds: AtomicUsize,
        healthy_finds: usize,
    }

    impl DocumentStore for FailingReads {
        async fn insert(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
            self.inner.insert(collection, key, fields).await
        }

        async fn find(&self, collection: &str, filters: &[FieldFilter]) -> Result<Vec<StoredDocument>, StoreError> {
            if self.finds.fetch_add(1, Ordering::SeqCst) >= self.healthy_finds {
                return Err(StoreError::new(StoreErrorCode::Unavailable, "read timed out"));
            }
            self.inner.find(collection, filters).await
        }

        async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
            self.inner.update(collection, key, fields).await
        }

        async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
            self.inner.delete(collection, key).await
        }

        async fn delete_many(&self, collection: &str, keys: &[String]) -> Result<(), StoreError> {
            self.inner.delete_many(collection, keys).await
        }
    }

    fn input(title: &str) -> CourseInput {
        CourseInput {
            title: title.to_string(),
            description: "A practical course".to_string(),
            category: "Programming".to_string(),
            level: "beginner".to_string(),
            language: "English".to_string(),
            duration: "6 weeks".to_string(),
            hours: "24".to_string(),
            price: 50.0,
            original_price: 100.0,
            ..CourseInput::default()
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_input_with_generated_fields() {
        let store = MemoryDocumentStore::new();
        let mut payload = input("Intro to Go!");
        payload.author = Some("Ada".into());
        payload.skills = vec!["goroutines".into(), "channels".into()];
        payload.modules = vec![CourseModule {
            title: "Basics".into(),
            description: "Syntax".into(),
            topics: vec!["types".into()],
        }];
        payload.tools = Tools {
            title: "Tooling".into(),
            description: String::new(),
            items: vec![Tool { name: "go vet".into(), icon: None }],
        };

        let created = create_course(&store, payload).await.unwrap();
        let fetched = get_course(&store, &created.id).await.unwrap();

        assert_eq!(fetched.title, "Intro to Go!");
        assert_eq!(fetched.slug, "intro-to-go");
        assert_eq!(fetched.status, CourseStatus::Draft);
        assert_eq!(fetched.author.as_deref(), Some("Ada"));
        assert_eq!(fetched.skills, vec!["goroutines", "channels"]);
        assert_eq!(fetched.modules, created.modules);
        assert_eq!(fetched.tools.items.len(), 1);
        assert!(fetched.features.is_empty());
        assert_eq!(fetched.price, 50.0);
        assert_eq!(fetched.original_price, 100.0);
        assert_eq!(fetched.created_at.timestamp(), created.created_at.timestamp());
    }

    #[tokio::test]
    async fn identifier_is_not_the_storage_key() {
        let store = MemoryDocumentStore::new();
        let created = create_course(&store, input("Rust")).await.unwrap();

        let docs = store.find(COURSES, &[]).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_ne!(docs[0].key, created.id);
    }

    #[tokio::test]
    async fn create_reports_every_missing_field() {
        let store = MemoryDocumentStore::new();
        let err = create_course(&store, CourseInput::default()).await.unwrap_err();
        let message = err.to_string();

        for field in ["Title", "Description", "Category", "Language", "Duration", "Hours", "Level"] {
            assert!(message.contains(field), "{} missing from {}", field, message);
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn create_rejects_unknown_status() {
        let store = MemoryDocumentStore::new();
        let mut payload = input("Rust");
        payload.status = Some("archived".into());
        assert!(matches!(
            create_course(&store, payload).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn price_rules_apply_on_create() {
        let store = MemoryDocumentStore::new();

        let mut too_expensive = input("A");
        too_expensive.price = 100.0;
        too_expensive.original_price = 50.0;
        assert!(create_course(&store, too_expensive).await.is_err());

        let mut free = input("B");
        free.price = 0.0;
        free.original_price = 0.0;
        assert!(create_course(&store, free).await.is_ok());
    }

    #[tokio::test]
    async fn get_by_blank_or_unknown_id_is_not_found() {
        let store = MemoryDocumentStore::new();
        assert!(get_course(&store, "   ").await.unwrap_err().is_not_found());
        assert!(get_course(&store, "missing").await.unwrap_err().is_not_found());
        assert!(get_course_by_slug(&store, "missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn get_by_slug_finds_course() {
        let store = MemoryDocumentStore::new();
        let created = create_course(&store, input("Data Science 101")).await.unwrap();
        let found = get_course_by_slug(&store, "data-science-101").await.unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn update_of_optional_fields_keeps_slug_and_skips_required_rules() {
        let store = MemoryDocumentStore::new();
        let created = create_course(&store, input("Intro to Go!")).await.unwrap();

        let patch = CoursePatch {
            rating: Some(4.5),
            features: Some(vec!["Certificate".into()]),
            ..CoursePatch::default()
        };
        let updated = update_course(&store, &created.id, patch).await.unwrap();

        assert_eq!(updated.slug, "intro-to-go");
        assert_eq!(updated.rating, 4.5);
        assert_eq!(updated.features, vec!["Certificate"]);
        assert_eq!(updated.id, created.id);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_with_title_regenerates_slug() {
        let store = MemoryDocumentStore::new();
        let created = create_course(&store, input("Old Title")).await.unwrap();

        let patch = CoursePatch {
            title: Some("Intro to Go!".into()),
            ..CoursePatch::default()
        };
        let updated = update_course(&store, &created.id, patch).await.unwrap();
        assert_eq!(updated.slug, "intro-to-go");
        assert_eq!(updated.description, "A practical course");
    }

    #[tokio::test]
    async fn update_with_blank_title_fails_validation() {
        let store = MemoryDocumentStore::new();
        let created = create_course(&store, input("Rust")).await.unwrap();

        let patch = CoursePatch {
            title: Some("  ".into()),
            ..CoursePatch::default()
        };
        let err = update_course(&store, &created.id, patch).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Title is required");
    }

    #[tokio::test]
    async fn update_checks_prices_against_stored_values() {
        let store = MemoryDocumentStore::new();
        let created = create_course(&store, input("Rust")).await.unwrap();

        let patch = CoursePatch {
            price: Some(150.0),
            ..CoursePatch::default()
        };
        let err = update_course(&store, &created.id, patch).await.unwrap_err();
        assert!(err.to_string().contains("Price cannot exceed original price"));
    }

    #[tokio::test]
    async fn update_answers_with_merged_record_when_reread_fails() {
        let inner = MemoryDocumentStore::new();
        let created = create_course(&inner, input("Rust")).await.unwrap();
        let store = FailingReads {
            inner,
            finds: AtomicUsize::new(0),
            healthy_finds: 1,
        };

        let patch = CoursePatch {
            hours: Some("30".into()),
            features: Some(vec!["Certificate".into()]),
            ..CoursePatch::default()
        };
        let updated = update_course(&store, &created.id, patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.hours, "30");
        assert_eq!(updated.features, vec!["Certificate"]);
        assert_eq!(updated.title, "Rust");
        assert_eq!(store.finds.load(Ordering::SeqCst), 2);

        let stored = get_course(&store.inner, &created.id).await.unwrap();
        assert_eq!(stored.hours, "30");
    }

    #[tokio::test]
    async fn update_status_rejects_unknown_values() {
        let store = MemoryDocumentStore::new();
        let created = create_course(&store, input("Rust")).await.unwrap();

        assert!(update_course_status(&store, &created.id, "archived").await.is_err());
        let published = update_course_status(&store, &created.id, "published").await.unwrap();
        assert_eq!(published.status, CourseStatus::Published);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_performs_no_writes() {
        let store = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::default();
        create_course(&store, input("Rust")).await.unwrap();
        let writes = store.write_count();

        let err = delete_course(&store, &objects, "missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn delete_removes_course_and_images_best_effort() {
        let store = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::default();
        objects
            .put_object("courses/bg.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        let mut payload = input("Rust");
        payload.background_image = Some(objects.public_url("courses/bg.png"));
        // Already gone from storage: must not block the delete.
        payload.certificate_image = Some(objects.public_url("certificates/missing.png"));
        let created = create_course(&store, payload).await.unwrap();

        delete_course(&store, &objects, &created.id).await.unwrap();

        assert!(objects.is_empty());
        assert!(get_course(&store, &created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn deleting_a_duplicate_keeps_images_of_the_source() {
        let store = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::default();
        objects
            .put_object("courses/bg.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        let url = objects.public_url("courses/bg.png");

        let mut payload = input("Rust");
        payload.background_image = Some(url.clone());
        let source = create_course(&store, payload).await.unwrap();
        let copy = duplicate_course(&store, &source.id, None).await.unwrap();

        delete_course(&store, &objects, &copy.id).await.unwrap();
        assert!(!objects.is_empty());
        assert_eq!(get_course(&store, &source.id).await.unwrap().background_image, Some(url));

        delete_course(&store, &objects, &source.id).await.unwrap();
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn bulk_delete_of_source_and_copy_removes_shared_image() {
        let store = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::default();
        objects
            .put_object("courses/cert.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        let mut payload = input("Rust");
        payload.certificate_image = Some(objects.public_url("courses/cert.png"));
        let source = create_course(&store, payload).await.unwrap();
        let copy = duplicate_course(&store, &source.id, None).await.unwrap();

        let deleted = delete_courses(&store, &objects, &[source.id, copy.id]).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn delete_many_counts_only_existing_courses() {
        let store = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::default();
        let a = create_course(&store, input("A")).await.unwrap();

        let deleted = delete_courses(&store, &objects, &[a.id.clone(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let err = delete_courses(&store, &objects, &["x".to_string(), "y".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No courses found"));
    }

    #[tokio::test]
    async fn duplicate_resets_engagement_and_status() {
        let store = MemoryDocumentStore::new();
        let mut payload = input("Rust");
        payload.status = Some("published".into());
        payload.enrolled_students = 50;
        payload.rating = 4.8;
        payload.total_ratings = 20;
        let source = create_course(&store, payload).await.unwrap();

        let copy = duplicate_course(&store, &source.id, None).await.unwrap();

        assert_ne!(copy.id, source.id);
        assert_eq!(copy.title, "Rust (Copy)");
        assert_eq!(copy.slug, "rust-copy");
        assert_eq!(copy.status, CourseStatus::Draft);
        assert_eq!(copy.enrolled_students, 0);
        assert_eq!(copy.rating, 0.0);
        assert_eq!(copy.total_ratings, 0);
        assert_eq!(copy.price, source.price);

        let named = duplicate_course(&store, &source.id, Some("Rust Advanced".into()))
            .await
            .unwrap();
        assert_eq!(named.slug, "rust-advanced");
    }

    #[tokio::test]
    async fn list_filters_searches_and_orders_newest_first() {
        let store = MemoryDocumentStore::new();
        let first = create_course(&store, input("Rust Basics")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let mut design = input("Figma Fundamentals");
        design.category = "Design".into();
        design.author = Some("Grace Rustworth".into());
        let second = create_course(&store, design).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let mut published = input("Go Concurrency");
        published.status = Some("published".into());
        let third = create_course(&store, published).await.unwrap();

        let all = list_courses(&store, &CourseFilter::default()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);

        let drafts = list_courses(
            &store,
            &CourseFilter {
                status: Some(CourseStatus::Draft),
                ..CourseFilter::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(drafts.len(), 2);

        let design_only = list_courses(
            &store,
            &CourseFilter {
                category: Some("Design".into()),
                ..CourseFilter::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(design_only.len(), 1);

        // Matches the title of one course and the author of another.
        let rust = list_courses(
            &store,
            &CourseFilter {
                search: Some("RUST".into()),
                ..CourseFilter::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(rust.len(), 2);

        let limited = list_courses(
            &store,
            &CourseFilter {
                limit: Some(1),
                ..CourseFilter::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(limited[0].id, third.id);
    }

    #[tokio::test]
    async fn stats_aggregate_counts_and_revenue() {
        let store = MemoryDocumentStore::new();
        let mut a = input("A");
        a.enrolled_students = 10;
        a.status = Some("published".into());
        let mut b = input("B");
        b.enrolled_students = 4;
        b.price = 25.0;
        b.level = "advanced".into();
        b.category = "Design".into();
        create_course(&store, a).await.unwrap();
        create_course(&store, b).await.unwrap();

        let stats = course_stats(&store).await.unwrap();
        assert_eq!(stats.total_courses, 2);
        assert_eq!(stats.published_courses, 1);
        assert_eq!(stats.draft_courses, 1);
        assert_eq!(stats.total_students, 14);
        assert_eq!(stats.total_revenue, 50.0 * 10.0 + 25.0 * 4.0);
        assert_eq!(stats.category_counts.get("Programming"), Some(&1));
        assert_eq!(stats.level_counts.get("advanced"), Some(&1));
    }

    #[tokio::test]
    async fn stats_saturate_on_huge_enrollments() {
        let store = MemoryDocumentStore::new();
        for title in ["A", "B"] {
            let mut payload = input(title);
            payload.enrolled_students = 10_000_000_000_000_000_000;
            create_course(&store, payload).await.unwrap();
        }

        let stats = course_stats(&store).await.unwrap();
        assert_eq!(stats.total_students, u64::MAX);
        assert!(stats.total_revenue.is_finite());
        assert!(serde_json::to_string(&stats).is_ok());
    }
}
