use serde::{Deserialize, Serialize};
#[cfg(feature = "ts")]
use ts_rs::TS;

use crate::asset::AssetResolver;
use crate::error::Result;
use crate::store::{Step, Variables};

/// A step as the presentation layer sees it, with asset ids resolved to locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct Action {
    pub line: String,
    pub character: Option<String>,
    pub switches: Vec<ActionSwitch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "ts", ts(optional))]
    pub bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "ts", ts(optional))]
    pub bgm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export, rename = "Switch"))]
pub struct ActionSwitch {
    pub text: String,
    pub enabled: bool,
}

impl Action {
    /// Fails with `AssetNotFound` rather than dropping an unknown asset.
    /// Switch conditions are evaluated against `variables`.
    pub fn from_step(step: &Step, assets: &AssetResolver, variables: &Variables) -> Result<Self> {
        Ok(Self {
            line: step.line.clone(),
            character: step.character.clone(),
            switches: step
                .switches
                .iter()
                .map(|switch| ActionSwitch {
                    text: switch.text.clone(),
                    enabled: switch.is_enabled(variables),
                })
                .collect(),
            bg: assets.resolve_opt(step.background.as_deref())?,
            bgm: assets.resolve_opt(step.music.as_deref())?,
        })
    }
}
