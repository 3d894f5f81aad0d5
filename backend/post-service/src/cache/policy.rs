use super::keys::{city_list_pattern, ALL_LISTS_PATTERN, SEARCH_PATTERN};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const POST_DETAIL_TTL: Duration = Duration::from_secs(10 * 60);
pub const POPULAR_CITY_LIST_TTL: Duration = Duration::from_secs(5 * 60);
pub const CITY_LIST_TTL: Duration = Duration::from_secs(10 * 60);
pub const SEARCH_TTL: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_POPULAR_CITIES: &[&str] = &["beijing", "shanghai", "guangzhou", "shenzhen"];

/// Time-to-live chosen per query shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    popular_cities: HashSet<String>,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::with_popular_cities(DEFAULT_POPULAR_CITIES.iter().copied())
    }
}

impl TtlPolicy {
    pub fn with_popular_cities<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            popular_cities: cities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn post_detail(&self) -> Duration {
        POST_DETAIL_TTL
    }

    /// Popular cities churn faster and get the shorter TTL; "all" does not.
    pub fn city_list(&self, city_code: Option<&str>) -> Duration {
        match city_code {
            Some(code) if self.popular_cities.contains(code) => POPULAR_CITY_LIST_TTL,
            _ => CITY_LIST_TTL,
        }
    }

    pub fn search(&self) -> Duration {
        SEARCH_TTL
    }

    pub fn is_popular(&self, city_code: &str) -> bool {
        self.popular_cities.contains(city_code)
    }
}

/// Which cached reads a new post clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationScope {
    /// Only `posts:city:{code}:*`. "All cities" lists and searches age out by TTL.
    #[default]
    City,
    /// Also `posts:city:all:*` and `search:*`
    Wide,
}

impl InvalidationScope {
    /// Patterns to delete after a post lands in `city_code`
    pub fn patterns(&self, city_code: &str) -> Vec<String> {
        let mut patterns = vec![city_list_pattern(city_code)];
        if *self == InvalidationScope::Wide {
            patterns.push(ALL_LISTS_PATTERN.to_string());
            patterns.push(SEARCH_PATTERN.to_string());
        }
        patterns
    }
}

impl FromStr for InvalidationScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "city" => Ok(Self::City),
            "wide" => Ok(Self::Wide),
            other => Err(format!(
                "unknown cache invalidation scope '{}' (expected city or wide)",
                other
            )),
        }
    }
}

impl fmt::Display for InvalidationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City => f.write_str("city"),
            Self::Wide => f.write_str("wide"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_ttl_by_city() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.city_list(Some("beijing")), Duration::from_secs(300));
        assert_eq!(policy.city_list(Some("shenzhen")), Duration::from_secs(300));
        assert_eq!(policy.city_list(Some("chengdu")), Duration::from_secs(600));
        assert_eq!(policy.city_list(None), Duration::from_secs(600));
    }

    #[test]
    fn test_fixed_ttls() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.post_detail(), Duration::from_secs(600));
        assert_eq!(policy.search(), Duration::from_secs(300));
    }

    #[test]
    fn test_custom_popular_set() {
        let policy = TtlPolicy::with_popular_cities(["chengdu"]);
        assert!(policy.is_popular("chengdu"));
        assert!(!policy.is_popular("beijing"));
        assert_eq!(policy.city_list(Some("beijing")), CITY_LIST_TTL);
    }

    #[test]
    fn test_invalidation_patterns() {
        assert_eq!(
            InvalidationScope::City.patterns("beijing"),
            vec!["posts:city:beijing:*".to_string()]
        );
        assert_eq!(
            InvalidationScope::Wide.patterns("beijing"),
            vec![
                "posts:city:beijing:*".to_string(),
                "posts:city:all:*".to_string(),
                "search:*".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!("city".parse::<InvalidationScope>(), Ok(InvalidationScope::City));
        assert_eq!(" WIDE ".parse::<InvalidationScope>(), Ok(InvalidationScope::Wide));
        assert!("everything".parse::<InvalidationScope>().is_err());
    }
}
