//! KPI-entry modes that shape the onboarding content.

use serde::{Deserialize, Serialize};

/// Who enters a store's KPIs.
///
/// Wire codes are the backend's uppercase identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KpiMode {
    /// The manager types daily figures in.
    #[default]
    #[serde(rename = "MANAGER_SAISIT")]
    ManagerEntry,
    /// Sellers enter their own figures.
    #[serde(rename = "VENDEUR_SAISIT")]
    SellerEntry,
    /// Figures are synced from the point-of-sale system.
    #[serde(rename = "API_SYNC")]
    ApiSync,
}

impl KpiMode {
    pub const ALL: [KpiMode; 3] = [Self::ManagerEntry, Self::SellerEntry, Self::ApiSync];

    pub fn code(&self) -> &'static str {
        match self {
            Self::ManagerEntry => "MANAGER_SAISIT",
            Self::SellerEntry => "VENDEUR_SAISIT",
            Self::ApiSync => "API_SYNC",
        }
    }

    /// Parse a wire code. Unknown or missing codes fall back to the default
    /// mode so onboarding always has content.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(code))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for KpiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
