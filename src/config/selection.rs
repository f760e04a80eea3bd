//! Selection and history configuration

use crate::history::REPORTABLE_AMOUNT;
use crate::rating::virtual_rating::{VirtualRatingConfig, VIRTUAL_C, VIRTUAL_K};
use crate::selection::{SelectionConfig, REPEAT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Recent answers whose questions are not served again
    pub repeat_window: usize,
    /// Recent answers counted toward the virtual rating
    pub virtual_window: usize,
    /// Virtual rating points per answer in the window
    pub virtual_k: f64,
    /// Recently answered questions offered for reporting
    pub reportable_amount: usize,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            repeat_window: REPEAT,
            virtual_window: VIRTUAL_C,
            virtual_k: VIRTUAL_K,
            reportable_amount: REPORTABLE_AMOUNT,
        }
    }
}

impl From<&SelectionSettings> for SelectionConfig {
    fn from(settings: &SelectionSettings) -> Self {
        Self {
            repeat_window: settings.repeat_window,
        }
    }
}

impl From<&SelectionSettings> for VirtualRatingConfig {
    fn from(settings: &SelectionSettings) -> Self {
        Self {
            window: settings.virtual_window,
            step: settings.virtual_k,
        }
    }
}
