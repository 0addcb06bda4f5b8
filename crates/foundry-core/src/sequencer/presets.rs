//! Canned prompts for the landing-page generator demo.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A landing-page demo, identified by the preview it ends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DemoPreset {
    Profile,
    Pricing,
    Alert,
}

impl DemoPreset {
    pub const ALL: [DemoPreset; 3] = [Self::Profile, Self::Pricing, Self::Alert];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Pricing => "pricing",
            Self::Alert => "alert",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Profile => "Generate a clean user profile card with a coral accent button.",
            Self::Pricing => "Create a premium enterprise pricing tier card with checkmarks.",
            Self::Alert => "Design a success notification toast with icon.",
        }
    }
}

impl fmt::Display for DemoPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown demo preset: {}", s))
    }
}
