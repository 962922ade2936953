//! Customer profile model.
//!
//! A profile is the normalized, read-only view of one customer that the
//! calendar engine evaluates activities against. Profiles are produced by
//! an upstream derivation step (see [`crate::profile`]).

use serde::{Deserialize, Serialize};

/// Normalized customer attributes.
///
/// All band/tier fields hold the upstream tokens verbatim (e.g. `"Metro"`,
/// `"Comfortable"`, `"13M"`). Eligibility is decided by exact string
/// membership, so no further normalization happens here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// Unique customer identifier.
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    /// Life stage segment (e.g. "Early Nester").
    #[serde(rename = "LifeStage")]
    pub life_stage: String,
    /// Behavioral persona tag used to size engagement caps.
    #[serde(rename = "SafariPersona")]
    pub safari_persona: String,
    /// Renewal bucket (e.g. "13M", "61+").
    #[serde(rename = "RenewalBucket")]
    pub renewal_bucket: String,
    /// Premium-to-income band.
    #[serde(rename = "PremiumToIncomeBand")]
    pub pti_band: String,
    /// City tier.
    #[serde(rename = "CityTier")]
    pub city_tier: String,
    /// Occupation type.
    #[serde(rename = "OccupationType")]
    pub occupation_type: String,
    /// Kids flag ("Y", "N", "Unsure").
    #[serde(rename = "KidsFlag")]
    pub kids_flag: String,
    /// Kids age band (e.g. "6-15").
    #[serde(rename = "KidsAgeBand")]
    pub kids_age_band: String,
    /// Share of policies ever surrendered (0.0..=1.0).
    #[serde(rename = "PercentSurrenders")]
    pub percent_surrenders: f64,
}

impl CustomerProfile {
    /// Creates a profile with the given ID and blank attributes.
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            life_stage: String::new(),
            safari_persona: String::new(),
            renewal_bucket: String::new(),
            pti_band: String::new(),
            city_tier: String::new(),
            occupation_type: String::new(),
            kids_flag: String::new(),
            kids_age_band: String::new(),
            percent_surrenders: 0.0,
        }
    }

    /// Sets the life stage.
    pub fn with_life_stage(mut self, life_stage: impl Into<String>) -> Self {
        self.life_stage = life_stage.into();
        self
    }

    /// Sets the persona.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.safari_persona = persona.into();
        self
    }

    /// Sets the renewal bucket.
    pub fn with_renewal_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.renewal_bucket = bucket.into();
        self
    }

    /// Sets the premium-to-income band.
    pub fn with_pti_band(mut self, band: impl Into<String>) -> Self {
        self.pti_band = band.into();
        self
    }

    /// Sets the city tier.
    pub fn with_city_tier(mut self, tier: impl Into<String>) -> Self {
        self.city_tier = tier.into();
        self
    }

    /// Sets the occupation type.
    pub fn with_occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation_type = occupation.into();
        self
    }

    /// Sets the kids flag and age band.
    pub fn with_kids(mut self, flag: impl Into<String>, age_band: impl Into<String>) -> Self {
        self.kids_flag = flag.into();
        self.kids_age_band = age_band.into();
        self
    }

    /// Sets the surrender ratio.
    pub fn with_percent_surrenders(mut self, ratio: f64) -> Self {
        self.percent_surrenders = ratio;
        self
    }
}
