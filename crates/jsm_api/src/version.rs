use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Dot-separated numeric version. Missing trailing segments compare as zero,
/// so `11` and `11.0.0` are equal.
#[derive(Debug, Clone)]
pub struct ApiVersion {
    segments: Vec<u32>,
}

impl ApiVersion {
    pub fn new(segments: impl Into<Vec<u32>>) -> Self {
        Self {
            segments: segments.into(),
        }
    }

    /// Parse `1..N` numeric groups, ignoring a trailing qualifier such as
    /// `-SNAPSHOT` or `.Final`. Blank input yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let mut segments = Vec::new();
        for group in text.split('.') {
            let digits: String = group.chars().take_while(|ch| ch.is_ascii_digit()).collect();
            if digits.is_empty() {
                break;
            }
            segments.push(digits.parse::<u32>().ok()?);
            if digits.len() != group.len() {
                break;
            }
        }

        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> u32 {
        self.segments.get(index).copied().unwrap_or(0)
    }

    pub fn major(&self) -> u32 {
        self.segment(0)
    }

    fn significant(&self) -> &[u32] {
        let len = self
            .segments
            .iter()
            .rposition(|segment| *segment != 0)
            .map_or(0, |index| index + 1);
        &self.segments[..len]
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ApiVersion {}

impl Hash for ApiVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|index| self.segment(index).cmp(&other.segment(index)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiVersion::parse(s).ok_or_else(|| format!("invalid version '{s}'"))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        ApiVersion::from_str(&value).map_err(serde::de::Error::custom)
    }
}
