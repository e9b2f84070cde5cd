use serde::{Deserialize, Serialize};
#[cfg(feature = "ts")]
use ts_rs::TS;

use crate::locale::Locale;
use crate::store::Variables;

/// A saved run. `fingerprint` ties it to the script it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct RunRecord {
    pub locale: Locale,
    pub cursor: usize,
    #[serde(default)]
    pub last_switch: Option<usize>,
    #[serde(default)]
    pub history: Vec<usize>,
    #[serde(default)]
    #[cfg_attr(
        feature = "ts",
        ts(type = "Record<string, string | number | boolean>")
    )]
    pub variables: Variables,
    pub fingerprint: String,
}
