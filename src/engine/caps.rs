//! Cap resolution.
//!
//! Picks a customer's total-activity quota. Exactly one branch fires:
//!
//! 1. persona has a configured cap → `SAFARI`
//! 2. life stage has a configured cap → `LIFESTAGE`
//! 3. otherwise the default cap → `DEFAULT`, plus an advisory
//!    `WARN_CAP_FALLBACK_DEFAULT` carried into every inclusion.

use crate::config::EngineConfig;
use crate::models::{CapSource, CustomerProfile, ReasonCode};

/// A resolved quota and its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCap {
    /// Maximum placements across the horizon.
    pub cap: u32,
    /// Which table supplied the cap.
    pub source: CapSource,
    /// Advisory code attached to inclusions, if any.
    pub advisory: Option<ReasonCode>,
}

/// Resolves the quota for a customer.
pub fn resolve_cap(customer: &CustomerProfile, config: &EngineConfig) -> ResolvedCap {
    if let Some(&cap) = config.persona_caps.get(&customer.safari_persona) {
        return ResolvedCap {
            cap,
            source: CapSource::Safari,
            advisory: None,
        };
    }
    if let Some(&cap) = config.life_stage_caps.get(&customer.life_stage) {
        return ResolvedCap {
            cap,
            source: CapSource::Lifestage,
            advisory: None,
        };
    }
    ResolvedCap {
        cap: config.default_cap,
        source: CapSource::Default,
        advisory: Some(ReasonCode::WarnCapFallbackDefault),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::default()
            .with_persona_cap("Lion", 24)
            .with_life_stage_cap("Early Nester", 12)
            .with_default_cap(6)
    }

    #[test]
    fn test_persona_wins_over_life_stage() {
        let c = CustomerProfile::new("C1")
            .with_persona("Lion")
            .with_life_stage("Early Nester");
        let r = resolve_cap(&c, &config());
        assert_eq!(r.cap, 24);
        assert_eq!(r.source, CapSource::Safari);
        assert_eq!(r.advisory, None);
    }

    #[test]
    fn test_life_stage_when_persona_missing() {
        let c = CustomerProfile::new("C1")
            .with_persona("Unicorn")
            .with_life_stage("Early Nester");
        let r = resolve_cap(&c, &config());
        assert_eq!(r.cap, 12);
        assert_eq!(r.source, CapSource::Lifestage);
        assert_eq!(r.advisory, None);
    }

    #[test]
    fn test_default_fallback_warns() {
        let c = CustomerProfile::new("C1")
            .with_persona("Unicorn")
            .with_life_stage("Retiree");
        let r = resolve_cap(&c, &config());
        assert_eq!(r.cap, 6);
        assert_eq!(r.source, CapSource::Default);
        assert_eq!(r.advisory, Some(ReasonCode::WarnCapFallbackDefault));
    }
}
