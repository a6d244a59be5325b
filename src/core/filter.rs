use serde::{Deserialize, Serialize};

/// Whether a body produces a physical response or only reports events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterKind {
    #[default]
    Solid,
    /// Sensors participate in detection and events but never receive or
    /// cause solver impulses.
    Sensor,
}

/// Layer/mask collision filter. Two bodies are testable iff each body's
/// layer bit is present in the other's mask.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub layer: u32,
    pub mask: u32,
    pub kind: FilterKind,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: 1,
            mask: u32::MAX,
            kind: FilterKind::Solid,
        }
    }
}

impl CollisionFilter {
    pub fn new(layer: u32, mask: u32) -> Self {
        Self {
            layer,
            mask,
            kind: FilterKind::Solid,
        }
    }

    pub fn sensor(layer: u32, mask: u32) -> Self {
        Self {
            layer,
            mask,
            kind: FilterKind::Sensor,
        }
    }

    /// Pure pair classification, applied before narrow-phase testing and
    /// again when deciding whether overlap feeds the solver.
    pub fn evaluate(a: &CollisionFilter, b: &CollisionFilter) -> FilterDecision {
        let testable = (a.layer & b.mask) != 0 && (b.layer & a.mask) != 0;
        FilterDecision {
            testable,
            respond: testable && a.kind == FilterKind::Solid && b.kind == FilterKind::Solid,
        }
    }
}

/// Outcome of filtering a candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDecision {
    /// The pair may proceed to narrow-phase testing.
    pub testable: bool,
    /// A confirmed overlap also produces solver impulses.
    pub respond: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_collide_and_respond() {
        let decision = CollisionFilter::evaluate(
            &CollisionFilter::default(),
            &CollisionFilter::default(),
        );
        assert!(decision.testable);
        assert!(decision.respond);
    }

    #[test]
    fn mutually_excluded_layers_are_not_testable() {
        let a = CollisionFilter::new(0b01, 0b01);
        let b = CollisionFilter::new(0b10, 0b10);
        let decision = CollisionFilter::evaluate(&a, &b);
        assert!(!decision.testable);
        assert!(!decision.respond);
    }

    #[test]
    fn one_sided_mask_is_not_testable() {
        // a can see b, but b cannot see a.
        let a = CollisionFilter::new(0b01, 0b11);
        let b = CollisionFilter::new(0b10, 0b10);
        assert!(!CollisionFilter::evaluate(&a, &b).testable);
    }

    #[test]
    fn sensors_are_testable_without_response() {
        let solid = CollisionFilter::default();
        let sensor = CollisionFilter::sensor(1, u32::MAX);
        let decision = CollisionFilter::evaluate(&solid, &sensor);
        assert!(decision.testable);
        assert!(!decision.respond);
    }

    #[test]
    fn evaluation_is_symmetric() {
        let a = CollisionFilter::new(0b01, 0b10);
        let b = CollisionFilter::sensor(0b10, 0b01);
        assert_eq!(
            CollisionFilter::evaluate(&a, &b),
            CollisionFilter::evaluate(&b, &a)
        );
    }
}
