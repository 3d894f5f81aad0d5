use super::ValidationError;
use std::collections::HashMap;

pub const CITY_CODE_MAX_CHARS: usize = 50;
pub const CITY_NAME_MAX_CHARS: usize = 100;

/// City code plus display name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct City {
    code: String,
    name: String,
}

impl City {
    pub fn new(code: &str, name: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        let name = name.trim();
        if code.is_empty() {
            return Err(ValidationError::Required { field: "city code" });
        }
        if name.is_empty() {
            return Err(ValidationError::Required { field: "city name" });
        }
        if code.chars().count() > CITY_CODE_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "city code",
                max: CITY_CODE_MAX_CHARS,
            });
        }
        if name.chars().count() > CITY_NAME_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "city name",
                max: CITY_NAME_MAX_CHARS,
            });
        }
        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

const DEFAULT_CITIES: &[(&str, &str)] = &[
    ("beijing", "北京"),
    ("shanghai", "上海"),
    ("guangzhou", "广州"),
    ("shenzhen", "深圳"),
    ("hangzhou", "杭州"),
    ("nanjing", "南京"),
    ("chengdu", "成都"),
    ("wuhan", "武汉"),
    ("xian", "西安"),
    ("tianjin", "天津"),
];

/// City code to display name lookup, loaded once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityDirectory {
    names: HashMap<String, String>,
}

impl Default for CityDirectory {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_CITIES.iter().copied())
    }
}

impl CityDirectory {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let names = pairs
            .into_iter()
            .map(|(code, name)| (code.trim().to_string(), name.trim().to_string()))
            .collect();
        Self { names }
    }

    /// Parse `code=name,code=name`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut pairs = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (code, name) = entry
                .split_once('=')
                .ok_or_else(|| format!("city entry '{}' must look like code=name", entry))?;
            if code.trim().is_empty() || name.trim().is_empty() {
                return Err(format!("city entry '{}' has an empty code or name", entry));
            }
            pairs.push((code, name));
        }
        if pairs.is_empty() {
            return Err("city directory cannot be empty".to_string());
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Display name for `code`; unknown codes map to themselves.
    pub fn name_for(&self, code: &str) -> String {
        self.names
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn resolve(&self, code: &str) -> Result<City, ValidationError> {
        let code = code.trim();
        City::new(code, &self.name_for(code))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
