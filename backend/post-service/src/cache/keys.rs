/// Cache key builders
///
/// Keys are plain strings so pattern invalidation can target a namespace prefix.
/// Page size is deliberately absent from list and search keys.
use crate::models::PostId;
use cache_store::escape_glob;

pub const ALL_CITIES: &str = "all";
pub const ALL_LISTS_PATTERN: &str = "posts:city:all:*";
pub const SEARCH_PATTERN: &str = "search:*";

/// `post:{id}`
pub fn post_key(id: PostId) -> String {
    format!("post:{}", id)
}

/// `posts:city:{code}:page:{page}`, or `posts:city:all:page:{page}` without a city
pub fn city_list_key(city_code: Option<&str>, page: u32) -> String {
    format!(
        "posts:city:{}:page:{}",
        city_code.unwrap_or(ALL_CITIES),
        page
    )
}

/// `search:{keyword}:page:{page}` or `search:{keyword}:city:{code}:page:{page}`
///
/// The keyword is trimmed and lowercased here, so callers may pass it raw.
pub fn search_key(keyword: &str, city_code: Option<&str>, page: u32) -> String {
    let keyword = normalize_keyword(keyword);
    match city_code {
        Some(code) => format!("search:{}:city:{}:page:{}", keyword, code, page),
        None => format!("search:{}:page:{}", keyword, page),
    }
}

pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Every list page cached for one city. Glob metacharacters in the code are escaped.
pub fn city_list_pattern(city_code: &str) -> String {
    format!("posts:city:{}:*", escape_glob(city_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_post_key() {
        let id = PostId::from(Uuid::nil());
        assert_eq!(post_key(id), "post:00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_list_keys() {
        assert_eq!(
            city_list_key(Some("beijing"), 1),
            "posts:city:beijing:page:1"
        );
        assert_eq!(city_list_key(None, 3), "posts:city:all:page:3");
    }

    #[test]
    fn test_search_keys_normalize_keyword() {
        assert_eq!(search_key("  TEST  ", None, 1), "search:test:page:1");
        assert_eq!(search_key("test", None, 1), search_key("  TEST  ", None, 1));
        assert_eq!(
            search_key("Overtime", Some("shanghai"), 2),
            "search:overtime:city:shanghai:page:2"
        );
    }

    #[test]
    fn test_city_pattern_does_not_cover_all_or_search() {
        let pattern = city_list_pattern("beijing");
        assert_eq!(pattern, "posts:city:beijing:*");
        assert!(cache_store::glob_match(
            &pattern,
            &city_list_key(Some("beijing"), 7)
        ));
        assert!(!cache_store::glob_match(&pattern, &city_list_key(None, 1)));
        assert!(!cache_store::glob_match(
            &pattern,
            &search_key("x", Some("beijing"), 1)
        ));
    }

    #[test]
    fn test_city_pattern_escapes_metacharacters() {
        for code in ["a[b]", r"x\y", "q?"] {
            let pattern = city_list_pattern(code);
            assert!(cache_store::glob_match(
                &pattern,
                &city_list_key(Some(code), 1)
            ));
        }

        let pattern = city_list_pattern("a*b");
        assert_eq!(pattern, r"posts:city:a\*b:*");
        assert!(!cache_store::glob_match(
            &pattern,
            &city_list_key(Some("axyb"), 1)
        ));
    }
}
