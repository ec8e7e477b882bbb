use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal tag carried by point markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intensity {
    #[default]
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Intensity {
    pub const ALL: [Intensity; 4] = [
        Intensity::Low,
        Intensity::Medium,
        Intensity::High,
        Intensity::VeryHigh,
    ];

    /// Value written to the annotation file.
    pub fn ordinal(self) -> u8 {
        match self {
            Intensity::Low => 0,
            Intensity::Medium => 1,
            Intensity::High => 2,
            Intensity::VeryHigh => 3,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(Intensity::Low),
            1 => Some(Intensity::Medium),
            2 => Some(Intensity::High),
            3 => Some(Intensity::VeryHigh),
            _ => None,
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
            Intensity::VeryHigh => "very-high",
        };
        f.write_str(name)
    }
}

impl FromStr for Intensity {
    type Err = String;

    /// Accepts either the display name or the file ordinal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<i64>() {
            return Intensity::from_ordinal(ordinal)
                .ok_or_else(|| format!("intensity ordinal out of range: {ordinal}"));
        }
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            "very-high" | "veryhigh" | "very_high" => Ok(Intensity::VeryHigh),
            other => Err(format!("unknown intensity: {other}")),
        }
    }
}

/// A single tagged point on the sample timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Marker {
    pub sample_index: usize,
    pub intensity: Intensity,
}

/// A closed interval of samples. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Section {
    start: usize,
    end: usize,
}

impl Section {
    /// Builds a section from two endpoints in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn intersects(&self, start: usize, end: usize) -> bool {
        self.start <= end && start <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationEntry {
    Marker(Marker),
    Section(Section),
}

impl AnnotationEntry {
    pub fn marker(sample_index: usize, intensity: Intensity) -> Self {
        AnnotationEntry::Marker(Marker {
            sample_index,
            intensity,
        })
    }

    pub fn section(a: usize, b: usize) -> Self {
        AnnotationEntry::Section(Section::new(a, b))
    }

    /// Sort key of the collection.
    pub fn start(&self) -> usize {
        match self {
            AnnotationEntry::Marker(m) => m.sample_index,
            AnnotationEntry::Section(s) => s.start(),
        }
    }

    pub fn end(&self) -> usize {
        match self {
            AnnotationEntry::Marker(m) => m.sample_index,
            AnnotationEntry::Section(s) => s.end(),
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, AnnotationEntry::Section(_))
    }

    /// Distance from `position` to the nearest point covered by this entry.
    pub fn distance_to(&self, position: usize) -> usize {
        if position < self.start() {
            self.start() - position
        } else if position > self.end() {
            position - self.end()
        } else {
            0
        }
    }
}
