//! Base price table: project type to starting price and complexity tier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Starting point for a breakdown before any modifiers apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRate {
    pub project_type: String,
    pub base_price: Decimal,
    pub complexity_multiplier: Decimal,
}

struct RateSeed {
    project_type: &'static str,
    base_price: i64,
    // complexity multiplier in hundredths, e.g. 115 = 1.15
    complexity: i64,
}

const RATE_SEEDS: &[RateSeed] = &[
    RateSeed { project_type: "marketing-site", base_price: 3_500, complexity: 100 },
    RateSeed { project_type: "web-app", base_price: 8_000, complexity: 115 },
    RateSeed { project_type: "e-commerce", base_price: 12_000, complexity: 120 },
    RateSeed { project_type: "web-portal", base_price: 10_000, complexity: 120 },
    RateSeed { project_type: "mobile-app", base_price: 15_000, complexity: 125 },
    RateSeed { project_type: "api-service", base_price: 7_000, complexity: 110 },
    RateSeed { project_type: "custom", base_price: 6_000, complexity: 100 },
];

/// Fallback tier for unknown or not-yet-answered project types. The wizard
/// must never dead-end a visitor, so lookups cannot fail.
pub const DEFAULT_PROJECT_TYPE: &str = "custom";

fn rate_from(seed: &RateSeed) -> BaseRate {
    BaseRate {
        project_type: seed.project_type.to_string(),
        base_price: Decimal::from(seed.base_price),
        complexity_multiplier: Decimal::new(seed.complexity, 2),
    }
}

/// Look up the base rate for a project type, case-insensitively. `None` or
/// an unrecognized value resolves to the [`DEFAULT_PROJECT_TYPE`] tier.
pub fn base_for(project_type: Option<&str>) -> BaseRate {
    let requested = project_type.map(str::trim).filter(|value| !value.is_empty());

    if let Some(requested) = requested {
        if let Some(seed) =
            RATE_SEEDS.iter().find(|seed| seed.project_type.eq_ignore_ascii_case(requested))
        {
            return rate_from(seed);
        }
    }

    let fallback = RATE_SEEDS
        .iter()
        .find(|seed| seed.project_type == DEFAULT_PROJECT_TYPE)
        .unwrap_or(&RATE_SEEDS[0]);
    rate_from(fallback)
}

/// All known project types, in table order, for the wizard and CLI output.
pub fn known_project_types() -> Vec<&'static str> {
    RATE_SEEDS.iter().map(|seed| seed.project_type).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{base_for, DEFAULT_PROJECT_TYPE};

    #[test]
    fn lookup_is_case_insensitive() {
        let rate = base_for(Some("Web-App"));
        assert_eq!(rate.project_type, "web-app");
        assert_eq!(rate.base_price, Decimal::from(8_000));
        assert_eq!(rate.complexity_multiplier, Decimal::new(115, 2));
    }

    #[test]
    fn unknown_project_type_falls_back_to_default_tier() {
        let rate = base_for(Some("quantum-widget"));
        assert_eq!(rate.project_type, DEFAULT_PROJECT_TYPE);
        assert_eq!(rate.base_price, Decimal::from(6_000));
    }

    #[test]
    fn missing_project_type_falls_back_to_default_tier() {
        assert_eq!(base_for(None).project_type, DEFAULT_PROJECT_TYPE);
        assert_eq!(base_for(Some("   ")).project_type, DEFAULT_PROJECT_TYPE);
    }
}
