use super::{City, ValidationError};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

pub const COMPANY_NAME_MAX_CHARS: usize = 100;
pub const CONTENT_MIN_CHARS: usize = 10;
pub const CONTENT_MAX_CHARS: usize = 5000;
pub const SUMMARY_CHARS: usize = 200;

/// Post identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(Uuid);

impl PostId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a textual UUID, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field: "post id" });
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|e| ValidationError::InvalidPostId(e.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for PostId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed company name, 1 to 100 characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyName(String);

impl CompanyName {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "company name",
            });
        }
        if trimmed.chars().count() > COMPANY_NAME_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "company name",
                max: COMPANY_NAME_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trimmed post body, 10 to 5000 characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content(String);

impl Content {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field: "content" });
        }
        let len = trimmed.chars().count();
        if len < CONTENT_MIN_CHARS {
            return Err(ValidationError::TooShort {
                field: "content",
                min: CONTENT_MIN_CHARS,
            });
        }
        if len > CONTENT_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "content",
                max: CONTENT_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 200 characters, with `...` appended when truncated
    pub fn summary(&self) -> String {
        if self.0.chars().count() <= SUMMARY_CHARS {
            return self.0.clone();
        }
        let mut summary: String = self.0.chars().take(SUMMARY_CHARS).collect();
        summary.push_str("...");
        summary
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submitted report about a company in a city
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: PostId,
    company: CompanyName,
    city: City,
    content: Content,
    created_at: DateTime<Utc>,
}

impl Post {
    /// A fresh post with a new id, stamped with the current time.
    pub fn new(company: CompanyName, city: City, content: Content) -> Self {
        Self {
            id: PostId::generate(),
            company,
            city,
            content,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a post that was already persisted.
    pub fn restore(
        id: PostId,
        company: CompanyName,
        city: City,
        content: Content,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company,
            city,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn company(&self) -> &CompanyName {
        &self.company
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_id_parse() {
        let id = PostId::generate();
        let parsed = PostId::parse(&format!("  {}  ", id)).unwrap();
        assert_eq!(parsed, id);

        assert!(matches!(
            PostId::parse("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            PostId::parse("not-a-uuid"),
            Err(ValidationError::InvalidPostId(_))
        ));
    }

    #[test]
    fn test_company_name_bounds() {
        assert!(CompanyName::new(&"a".repeat(100)).is_ok());
        assert!(matches!(
            CompanyName::new(&"a".repeat(101)),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
        assert!(CompanyName::new("   ").is_err());
        assert_eq!(CompanyName::new("  Acme  ").unwrap().as_str(), "Acme");
    }

    #[test]
    fn test_company_name_counts_characters_not_bytes() {
        // 100 three-byte characters
        assert!(CompanyName::new(&"公".repeat(100)).is_ok());
        assert!(CompanyName::new(&"公".repeat(101)).is_err());
    }

    #[test]
    fn test_content_bounds() {
        assert!(matches!(
            Content::new(&"a".repeat(9)),
            Err(ValidationError::TooShort { min: 10, .. })
        ));
        assert!(Content::new(&"a".repeat(10)).is_ok());
        assert!(Content::new(&"a".repeat(5000)).is_ok());
        assert!(Content::new(&"a".repeat(5001)).is_err());
        // Trimmed before counting
        assert!(Content::new(&format!("   {}   ", "a".repeat(9))).is_err());
    }

    #[test]
    fn test_content_summary() {
        let short = Content::new("short enough content").unwrap();
        assert_eq!(short.summary(), "short enough content");

        let long = Content::new(&"字".repeat(250)).unwrap();
        let summary = long.summary();
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 203);
    }

    #[test]
    fn test_new_post_gets_fresh_identity() {
        let city = City::new("beijing", "北京").unwrap();
        let a = Post::new(
            CompanyName::new("Acme").unwrap(),
            city.clone(),
            Content::new("0123456789").unwrap(),
        );
        let b = Post::new(
            CompanyName::new("Acme").unwrap(),
            city,
            Content::new("0123456789").unwrap(),
        );
        assert_ne!(a.id(), b.id());
    }
}
