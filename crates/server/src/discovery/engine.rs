use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::discovery::catalog::{Catalog, CuratedCourse, Platform};
use crate::models::resource::SourceType;
use crate::slug::timestamp_token;

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_RESULTS: usize = 20;
pub const MAX_GENERATED: usize = 15;

const COURSE_TYPE: &str = "Curso";
const GENERATED_CATEGORY: &str = "Outro";
const FALLBACK_SEARCH_URL: &str = "https://www.google.com/search?q=";
const COVER_BASE_URL: &str = "https://placehold.co/600x900";

/// A course synthesized for a single search. Never persisted; ids are only unique
/// within one call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryCourse {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub category: String,
    pub description: String,
    pub cover_image: String,
    pub source_type: SourceType,
    pub external_url: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Discovers courses for `search_query` using the built-in catalog.
pub fn discover_courses(search_query: &str) -> Vec<DiscoveryCourse> {
    discover_with(Catalog::builtin(), search_query, Utc::now())
}

/// Curated matches come first in dataset order, followed by generated entries, capped at
/// [`MAX_RESULTS`]. Queries shorter than [`MIN_QUERY_CHARS`] after trimming yield nothing.
pub fn discover_with(
    catalog: &Catalog,
    search_query: &str,
    now: DateTime<Utc>,
) -> Vec<DiscoveryCourse> {
    if search_query.trim().chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let query = search_query.to_lowercase();
    let token = timestamp_token(now);
    let curated: Vec<&CuratedCourse> = catalog
        .curated
        .iter()
        .filter(|course| course.matches(&query))
        .collect();
    let generated = generate_courses(catalog, search_query, &curated, &token, now);

    curated
        .iter()
        .enumerate()
        .map(|(idx, course)| mirror_course(catalog, idx, course, &token, now))
        .chain(generated)
        .take(MAX_RESULTS)
        .collect()
}

fn mirror_course(
    catalog: &Catalog,
    idx: usize,
    course: &CuratedCourse,
    token: &str,
    now: DateTime<Utc>,
) -> DiscoveryCourse {
    let platform = catalog.platform_for_source(course.source);
    let category = if course.category.is_empty() {
        GENERATED_CATEGORY
    } else {
        course.category
    };
    DiscoveryCourse {
        id: format!("mirrored-{idx}-{token}"),
        title: course.title.to_string(),
        author: course.author.to_string(),
        kind: COURSE_TYPE,
        category: category.to_string(),
        description: course.description.to_string(),
        cover_image: cover_image_url(platform, course.title),
        source_type: SourceType::ExternalLink,
        external_url: course.url.to_string(),
        source: course.source.to_string(),
        credential_type: None,
        featured: false,
        created_at: now,
    }
}

fn generate_courses(
    catalog: &Catalog,
    search_query: &str,
    curated: &[&CuratedCourse],
    token: &str,
    now: DateTime<Utc>,
) -> Vec<DiscoveryCourse> {
    let mut generated = Vec::new();
    if catalog.platforms.is_empty()
        || catalog.universities.is_empty()
        || catalog.credential_types.is_empty()
    {
        return generated;
    }

    let theme = capitalize_first(search_query);
    for i in 0..MAX_GENERATED {
        if generated.len() + curated.len() >= MAX_RESULTS {
            break;
        }

        let university = catalog.universities[i % catalog.universities.len()];
        let platform = &catalog.platforms[i % catalog.platforms.len()];
        let credential = catalog.credential_types[i % catalog.credential_types.len()];
        let title = generated_title(&theme, credential, i);

        let lowered = title.to_lowercase();
        if curated
            .iter()
            .any(|course| course.title.to_lowercase() == lowered)
        {
            continue;
        }

        generated.push(DiscoveryCourse {
            id: format!("universal-{}-{i}-{token}", dashed_lowercase(platform.source)),
            author: university.to_string(),
            kind: COURSE_TYPE,
            category: GENERATED_CATEGORY.to_string(),
            description: format!(
                "Aprofunde os seus conhecimentos em {search_query} com este curso certificado de {university}. \
                 Um programa intensivo focado em resultados práticos e excelência académica via {}.",
                platform.source
            ),
            cover_image: cover_image_url(platform, &title),
            source_type: SourceType::ExternalLink,
            external_url: course_search_url(platform, search_query),
            source: platform.source.to_string(),
            credential_type: Some(credential.to_string()),
            featured: false,
            created_at: now,
            title,
        });
    }
    generated
}

fn generated_title(theme: &str, credential: &str, i: usize) -> String {
    if i == 0 {
        format!("{theme}: {credential} Foundations")
    } else {
        let audience = if i % 2 == 0 {
            "Professionals"
        } else {
            "Beginners"
        };
        format!("{credential} {theme} for {audience}")
    }
}

/// Platform search URL for the raw query, or a web search scoped to the platform when the
/// platform has no search endpoint of its own.
pub fn course_search_url(platform: &Platform, search_query: &str) -> String {
    match platform.search_url {
        Some(base) => format!("{base}{}", urlencoding::encode(search_query)),
        None => format!(
            "{FALLBACK_SEARCH_URL}{}",
            urlencoding::encode(&format!("{} {search_query} course", platform.source))
        ),
    }
}

pub fn cover_image_url(platform: &Platform, title: &str) -> String {
    format!(
        "{COVER_BASE_URL}/{}/ffffff?font=playfair-display&text={}",
        platform.color,
        urlencoding::encode(&format!("{}: {title}", platform.source))
    )
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn dashed_lowercase(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
    }

    fn discover(query: &str) -> Vec<DiscoveryCourse> {
        discover_with(Catalog::builtin(), query, now())
    }

    fn is_curated(course: &DiscoveryCourse) -> bool {
        course.id.starts_with("mirrored-")
    }

    fn titles(courses: &[DiscoveryCourse]) -> Vec<String> {
        courses.iter().map(|c| c.title.clone()).collect()
    }

    #[test]
    fn short_queries_yield_nothing() {
        for query in ["", "a", " ", "  b  ", "\tz\n"] {
            assert!(discover(query).is_empty(), "query {query:?}");
        }
    }

    #[test]
    fn cs50_puts_harvard_course_first() {
        let courses = discover("cs50");

        assert_eq!(courses[0].title, "CS50: Introduction to Computer Science");
        assert_eq!(courses[0].author, "Harvard University");
        assert_eq!(
            courses[0].external_url,
            "https://pll.harvard.edu/course/cs50-introduction-computer-science"
        );
        assert_eq!(courses.iter().filter(|c| is_curated(c)).count(), 1);
        assert_eq!(courses.len(), 1 + MAX_GENERATED);
        assert!(courses[1..]
            .iter()
            .all(|c| c.title != "CS50: Introduction to Computer Science"));
    }

    #[test]
    fn economia_matches_by_keyword_and_category_and_fills_to_cap() {
        let courses = discover("economia");
        let curated: Vec<&str> = courses
            .iter()
            .filter(|c| is_curated(c))
            .map(|c| c.title.as_str())
            .collect();

        assert_eq!(
            curated,
            vec![
                "CS50: Introduction to Computer Science",
                "Entrepreneurship in Emerging Economies",
                "Artificial Intelligence (AI)",
                "Microeconomics",
                "Diploma in Project Management",
                "Machine Learning (Stanford)",
            ]
        );
        assert_eq!(courses.len(), MAX_RESULTS);
        assert!(courses[..6].iter().all(is_curated));
    }

    #[test]
    fn unmatched_query_is_fully_generated_from_templates() {
        let courses = discover("xylophone");

        assert_eq!(courses.len(), MAX_GENERATED);
        assert!(courses.iter().all(|c| !is_curated(c)));
        assert_eq!(courses[0].title, "Xylophone: Professional Certificate Foundations");
        assert_eq!(courses[1].title, "Specialization Xylophone for Beginners");
        assert_eq!(
            courses[2].title,
            "MicroMasters® Program Xylophone for Professionals"
        );
        assert_eq!(courses[6].title, "Professional Certificate Xylophone for Professionals");
        assert_eq!(courses[0].author, "Stanford University");
        assert_eq!(courses[13].author, "Stanford University");
        assert_eq!(courses[0].source, "Harvard Online");
        assert_eq!(courses[7].source, "Harvard Online");
        assert_eq!(courses[1].credential_type.as_deref(), Some("Specialization"));
        assert_eq!(courses[4].category, "Outro");
    }

    #[test]
    fn keyword_matching_runs_keyword_in_query_direction() {
        // "estat" is a prefix of the "estatistica" keyword but contains no keyword itself
        assert!(discover("estat").iter().all(|c| !is_curated(c)));

        let courses = discover("quero estatistica");
        assert!(courses
            .iter()
            .any(|c| is_curated(c) && c.title == "Data Science: R Basics"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let curated_titles = |query: &str| -> Vec<String> {
            discover(query)
                .into_iter()
                .filter(is_curated)
                .map(|c| c.title)
                .collect()
        };

        let upper = curated_titles("MICROECONOMICS");
        assert_eq!(upper, curated_titles("microeconomics"));
        assert!(upper.iter().any(|t| t == "Microeconomics"));
    }

    #[test]
    fn output_never_exceeds_cap() {
        for query in ["ia", "dados", "tecnologia", "medicina business", "xy", "economia"] {
            assert!(discover(query).len() <= MAX_RESULTS, "query {query}");
        }
    }

    #[test]
    fn urls_and_covers_are_well_formed() {
        for query in ["cs50", "história da arte", "c++ & rust"] {
            for course in discover(query) {
                assert!(course.external_url.starts_with("https://"), "{course:?}");
                assert!(course.cover_image.starts_with("https://placehold.co/600x900/"));
                assert!(
                    course
                        .cover_image
                        .contains(urlencoding::encode(&course.title).as_ref()),
                    "{course:?}"
                );
                assert_eq!(course.kind, "Curso");
                assert_eq!(course.source_type, SourceType::ExternalLink);
                assert!(!course.featured);
            }
        }
    }

    #[test]
    fn generated_urls_encode_raw_query() {
        let courses = discover("c++ & rust");
        let generated = courses.iter().find(|c| !is_curated(c)).unwrap();
        assert_eq!(generated.source, "Harvard Online");
        assert_eq!(
            generated.external_url,
            "https://pll.harvard.edu/search?q=c%2B%2B%20%26%20rust"
        );
    }

    #[test]
    fn ids_are_unique_within_a_call() {
        let courses = discover("economia");
        let ids: HashSet<&str> = courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), courses.len());
    }

    #[test]
    fn repeated_calls_agree_on_titles_but_not_ids() {
        let first = discover_with(Catalog::builtin(), "python", now());
        let second = discover_with(
            Catalog::builtin(),
            "python",
            now() + Duration::milliseconds(1),
        );

        assert_eq!(titles(&first), titles(&second));
        assert_ne!(first[0].id, second[0].id);
    }

    static TEST_PLATFORMS: [Platform; 1] = [Platform {
        source: "Open Campus",
        color: "123456",
        search_url: None,
    }];

    static TEST_CURATED: [CuratedCourse; 2] = [
        CuratedCourse {
            title: "Rust: Professional Certificate Foundations",
            author: "Ferris University",
            source: "Open Campus",
            description: "Ownership and borrowing.",
            url: "https://campus.example/rust",
            category: "Tecnologia",
            keywords: &["rust"],
        },
        CuratedCourse {
            title: "Rust Systems",
            author: "Ferris University",
            source: "Unlisted Platform",
            description: "Lower level.",
            url: "https://campus.example/systems",
            category: "",
            keywords: &["rust"],
        },
    ];

    static TEST_UNIVERSITIES: [&str; 1] = ["Ferris University"];
    static TEST_CREDENTIALS: [&str; 2] = ["Professional Certificate", "Bootcamp"];

    static TEST_CATALOG: Catalog = Catalog {
        platforms: &TEST_PLATFORMS,
        fallback_platform: Platform {
            source: "Fallback",
            color: "000000",
            search_url: None,
        },
        curated: &TEST_CURATED,
        universities: &TEST_UNIVERSITIES,
        credential_types: &TEST_CREDENTIALS,
    };

    #[test]
    fn generated_title_equal_to_curated_title_is_skipped() {
        let courses = discover_with(&TEST_CATALOG, "rust", now());

        let duplicates = courses
            .iter()
            .filter(|c| c.title.eq_ignore_ascii_case("Rust: Professional Certificate Foundations"))
            .count();
        assert_eq!(duplicates, 1);
        assert!(is_curated(&courses[0]));
        // two curated, index 0 skipped, remaining fourteen generated
        assert_eq!(courses.len(), 2 + MAX_GENERATED - 1);
        assert_eq!(courses[2].title, "Bootcamp Rust for Beginners");
        assert!(courses[2].id.starts_with("universal-open-campus-1-"));
    }

    #[test]
    fn platform_without_search_endpoint_uses_web_search() {
        let courses = discover_with(&TEST_CATALOG, "rust", now());
        let generated = courses.iter().find(|c| !is_curated(c)).unwrap();
        assert_eq!(
            generated.external_url,
            "https://www.google.com/search?q=Open%20Campus%20rust%20course"
        );
    }

    #[test]
    fn curated_course_with_unknown_platform_uses_fallback_colors() {
        let courses = discover_with(&TEST_CATALOG, "rust", now());
        let systems = courses.iter().find(|c| c.title == "Rust Systems").unwrap();

        assert!(systems.cover_image.starts_with("https://placehold.co/600x900/000000/"));
        assert!(systems.cover_image.contains("Fallback%3A%20Rust%20Systems"));
        assert_eq!(systems.category, "Outro");
        assert_eq!(systems.source, "Unlisted Platform");
    }

    #[test]
    fn serializes_like_a_resource_entry() {
        let course = discover("cs50").remove(0);
        let value = serde_json::to_value(&course).unwrap();

        assert_eq!(value["type"], "Curso");
        assert_eq!(value["sourceType"], "external_link");
        assert!(value.get("externalUrl").is_some());
        assert!(value.get("credentialType").is_none());
    }
}
