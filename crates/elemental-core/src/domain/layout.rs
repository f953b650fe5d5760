//! Static layout of an element.
//!
//! Only the layout *kind* is determined here; sizing and CSS are the host
//! page's business.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::LifecycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    Nodisplay,
    Fixed,
    FixedHeight,
    Responsive,
    Container,
    Fill,
    FlexItem,
    Intrinsic,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Nodisplay => "nodisplay",
            Layout::Fixed => "fixed",
            Layout::FixedHeight => "fixed-height",
            Layout::Responsive => "responsive",
            Layout::Container => "container",
            Layout::Fill => "fill",
            Layout::FlexItem => "flex-item",
            Layout::Intrinsic => "intrinsic",
        }
    }

    /// Derives the layout from the `layout`, `width` and `height` attributes.
    ///
    /// Without an explicit `layout`: width and height give `fixed`, height
    /// alone gives `fixed-height`, nothing gives `container`.
    pub fn from_attributes(
        layout: Option<&str>,
        width: Option<&str>,
        height: Option<&str>,
    ) -> Result<Layout, LifecycleError> {
        if let Some(value) = layout {
            return value.parse();
        }
        Ok(match (width, height) {
            (Some(_), Some(_)) => Layout::Fixed,
            (None, Some(_)) => Layout::FixedHeight,
            _ => Layout::Container,
        })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "nodisplay" => Ok(Layout::Nodisplay),
            "fixed" => Ok(Layout::Fixed),
            "fixed-height" => Ok(Layout::FixedHeight),
            "responsive" => Ok(Layout::Responsive),
            "container" => Ok(Layout::Container),
            "fill" => Ok(Layout::Fill),
            "flex-item" => Ok(Layout::FlexItem),
            "intrinsic" => Ok(Layout::Intrinsic),
            other => Err(LifecycleError::InvalidLayout(other.to_string())),
        }
    }
}
