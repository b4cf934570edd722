//! Runtime requirement metadata reported to the host

use serde::{Deserialize, Serialize};

/// Connectivity and GUI requirements of a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRequirements {
    pub internet_before_load: bool,
    pub network_before_load: bool,
    pub gui_before_load: bool,
    pub requires_internet: bool,
    pub requires_network: bool,
    pub requires_gui: bool,
    pub no_internet_fallback: bool,
    pub no_network_fallback: bool,
    pub no_gui_fallback: bool,
}

impl RuntimeRequirements {
    /// Online-only skill without a GUI
    pub const fn online_headless() -> Self {
        Self {
            internet_before_load: true,
            network_before_load: true,
            gui_before_load: false,
            requires_internet: true,
            requires_network: true,
            requires_gui: false,
            no_internet_fallback: false,
            no_network_fallback: false,
            no_gui_fallback: true,
        }
    }
}
