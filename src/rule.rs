//! The detection rule record and its identifier scheme.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The closed set of detection platforms a rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Sentinel,
    Splunk,
    CrowdStrike,
    Chronicle,
    Yara,
    Sigma,
}

impl Platform {
    /// All supported platforms, in display order.
    pub const ALL: [Platform; 6] = [
        Platform::Sentinel,
        Platform::Splunk,
        Platform::CrowdStrike,
        Platform::Chronicle,
        Platform::Yara,
        Platform::Sigma,
    ];
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Sentinel => write!(f, "Sentinel"),
            Platform::Splunk => write!(f, "Splunk"),
            Platform::CrowdStrike => write!(f, "CrowdStrike"),
            Platform::Chronicle => write!(f, "Chronicle (YARA-L)"),
            Platform::Yara => write!(f, "YARA"),
            Platform::Sigma => write!(f, "Sigma"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sentinel" => Ok(Platform::Sentinel),
            "splunk" => Ok(Platform::Splunk),
            "crowdstrike" => Ok(Platform::CrowdStrike),
            "chronicle" | "chronicle (yara-l)" | "yara-l" => Ok(Platform::Chronicle),
            "yara" => Ok(Platform::Yara),
            "sigma" => Ok(Platform::Sigma),
            _ => Err(format!("Invalid platform: {}", s)),
        }
    }
}

/// A single detection rule record.
///
/// `id` and `title` are always populated before a rule is persisted;
/// everything else is free text the author may leave empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "platform_str")]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub references: String,
    #[serde(default)]
    pub created_by: String,
    pub date_added: NaiveDate,
}

/// On the wire a platform is its display string, with an empty string
/// standing for "no platform selected".
mod platform_str {
    use super::Platform;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        platform: &Option<Platform>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match platform {
            Some(p) => serializer.serialize_str(&p.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Platform>, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Ok(None);
        }
        s.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

/// Generate a rule id from its title: a lowercase slug joined to a
/// second-resolution timestamp. Not collision-free within the same second
/// for identical titles; `upsert` matching by id makes that last-writer-wins.
pub fn generate_id(title: &str) -> String {
    slug_id(title, Local::now().naive_local())
}

pub(crate) fn slug_id(title: &str, at: NaiveDateTime) -> String {
    format!("{}-{}", slugify(title), at.format("%Y%m%d%H%M%S"))
}

/// Lowercase the title and collapse every run of non-alphanumeric
/// characters into a single hyphen.
fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(13, 45, 9)
            .unwrap()
    }

    #[test]
    fn test_slug_id_basic() {
        let id = slug_id("Suspicious PowerShell", fixed_time());
        assert_eq!(id, "suspicious-powershell-20250615134509");
    }

    #[test]
    fn test_slug_id_collapses_punctuation_runs() {
        let id = slug_id("LSASS -- Credential  Dump!!", fixed_time());
        assert_eq!(id, "lsass-credential-dump-20250615134509");
    }

    #[test]
    fn test_generate_id_charset_and_timestamp() {
        let id = generate_id("C2 Beaconing (DNS)");
        assert_eq!(id, id.to_lowercase());
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
        let suffix = &id[id.len() - 14..];
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
        assert!(id.starts_with("c2-beaconing-dns-"));
    }

    #[test]
    fn test_platform_parse_display_roundtrip() {
        for p in Platform::ALL {
            let parsed: Platform = p.to_string().parse().unwrap();
            assert_eq!(parsed, p);
        }
        assert_eq!("chronicle".parse::<Platform>().unwrap(), Platform::Chronicle);
        assert!("snort".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_empty_string_is_none() {
        let json = r#"{
            "id": "test-rule-20250615134509",
            "title": "Test Rule",
            "platform": "",
            "date_added": "2025-06-15"
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert!(rule.platform.is_none());
        assert_eq!(rule.description, "");

        let out = serde_json::to_string(&rule).unwrap();
        assert!(out.contains(r#""platform":"""#));
    }

    #[test]
    fn test_platform_serde_named() {
        let json = r#"{
            "id": "test-rule-20250615134509",
            "title": "Test Rule",
            "platform": "Chronicle (YARA-L)",
            "date_added": "2025-06-15"
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.platform, Some(Platform::Chronicle));
    }
}
