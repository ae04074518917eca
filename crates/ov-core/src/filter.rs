//! Text filters over regions, used to pick regions for bulk removal.

use crate::id::ShapeId;
use crate::model::TextRegion;
use regex_lite::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Contains,
    Starts,
    Ends,
    Regex,
}

/// Which text of a region the filter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    #[default]
    Src,
    Tgt,
}

/// A compiled region filter.
///
/// A blank pattern matches every region, and so does a pattern that fails
/// to compile in regex mode.
#[derive(Debug, Clone)]
pub struct RegionFilter {
    mode: FilterMode,
    field: FilterField,
    case_sensitive: bool,
    needle: String,
    regex: Option<Regex>,
}

impl RegionFilter {
    pub fn new(mode: FilterMode, field: FilterField, pattern: &str, case_sensitive: bool) -> Self {
        let regex = match mode {
            FilterMode::Regex if !pattern.trim().is_empty() => RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .inspect_err(|e| log::debug!("region filter: invalid regex {pattern:?}: {e}"))
                .ok(),
            _ => None,
        };
        let needle = if case_sensitive {
            pattern.to_string()
        } else {
            pattern.to_lowercase()
        };
        Self {
            mode,
            field,
            case_sensitive,
            needle,
            regex,
        }
    }

    /// A blank filter selects everything and must not drive a bulk delete.
    pub fn is_active(&self) -> bool {
        !self.needle.trim().is_empty()
    }

    pub fn matches(&self, region: &TextRegion) -> bool {
        if !self.is_active() {
            return true;
        }
        let raw = match self.field {
            FilterField::Src => region.src_text.as_str(),
            FilterField::Tgt => region.tgt_text.as_deref().unwrap_or_default(),
        };
        let value = if self.case_sensitive {
            raw.to_string()
        } else {
            raw.to_lowercase()
        };
        match self.mode {
            FilterMode::Contains => value.contains(&self.needle),
            FilterMode::Starts => value.starts_with(&self.needle),
            FilterMode::Ends => value.ends_with(&self.needle),
            FilterMode::Regex => self.regex.as_ref().is_none_or(|re| re.is_match(raw)),
        }
    }

    /// Ids of the regions this filter selects. Empty for a blank filter.
    pub fn matching_ids<'a>(&self, regions: impl IntoIterator<Item = &'a TextRegion>) -> Vec<ShapeId> {
        if !self.is_active() {
            return Vec::new();
        }
        regions
            .into_iter()
            .filter(|r| self.matches(r))
            .map(|r| r.id)
            .collect()
    }
}
