//! Scoped guards held for the duration of one export.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::surface::style::PresentationAttr;
use crate::surface::{SharedSurface, SurfaceId};

/// Overrides a surface's inline presentation attributes and puts the previous
/// values back when dropped.
///
/// Every attribute in [`PresentationAttr::ALL`] is snapshotted, so an attribute
/// that was absent before is removed again rather than left at its override.
pub struct PresentationOverride {
    surface: SharedSurface,
    saved: Vec<(PresentationAttr, Option<String>)>,
}

impl PresentationOverride {
    pub fn apply(surface: SharedSurface, overrides: &[(PresentationAttr, &str)]) -> Self {
        let saved = {
            let mut guard = surface.lock();
            let saved: Vec<_> = PresentationAttr::ALL
                .iter()
                .map(|&attr| (attr, guard.attr(attr).map(str::to_string)))
                .collect();
            for &(attr, value) in overrides {
                guard.set_attr(attr, value);
            }
            saved
        };
        Self { surface, saved }
    }
}

impl Drop for PresentationOverride {
    fn drop(&mut self) {
        let mut guard = self.surface.lock();
        for (attr, value) in self.saved.drain(..) {
            match value {
                Some(value) => guard.set_attr(attr, value),
                None => guard.remove_attr(attr),
            }
        }
        debug!(surface = %guard.id(), "presentation attributes restored");
    }
}

/// Marks a surface as being exported; released on drop.
pub struct InFlight {
    active: Arc<Mutex<HashSet<SurfaceId>>>,
    id: SurfaceId,
}

impl InFlight {
    /// `None` when an export of `id` is already running.
    pub fn acquire(active: &Arc<Mutex<HashSet<SurfaceId>>>, id: &SurfaceId) -> Option<Self> {
        if !active.lock().insert(id.clone()) {
            return None;
        }
        Some(Self {
            active: Arc::clone(active),
            id: id.clone(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.active.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FontFamily;
    use crate::surface::node::Node;
    use crate::surface::Surface;
    use proptest::prelude::*;

    fn shared_surface() -> SharedSurface {
        Arc::new(Mutex::new(Surface::new(
            SurfaceId::preview(),
            Node::block(Vec::new()),
            FontFamily::default(),
            900.0,
        )))
    }

    fn snapshot(surface: &SharedSurface) -> Vec<(PresentationAttr, Option<String>)> {
        let guard = surface.lock();
        PresentationAttr::ALL
            .iter()
            .map(|&attr| (attr, guard.attr(attr).map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_override_is_visible_while_held() {
        let surface = shared_surface();
        let guard = PresentationOverride::apply(
            Arc::clone(&surface),
            &[(PresentationAttr::BoxShadow, "none")],
        );
        assert_eq!(
            surface.lock().attr(PresentationAttr::BoxShadow),
            Some("none")
        );
        drop(guard);
        assert_eq!(surface.lock().attr(PresentationAttr::BoxShadow), None);
    }

    #[test]
    fn test_in_flight_rejects_second_acquire_until_released() {
        let active = Arc::new(Mutex::new(HashSet::new()));
        let id = SurfaceId::preview();
        let first = InFlight::acquire(&active, &id);
        assert!(first.is_some());
        assert!(InFlight::acquire(&active, &id).is_none());
        assert!(InFlight::acquire(&active, &SurfaceId::new("other")).is_some());
        drop(first);
        assert!(InFlight::acquire(&active, &id).is_some());
    }

    fn attr_values() -> impl Strategy<Value = Vec<Option<String>>> {
        proptest::collection::vec(
            proptest::option::of(prop_oneof![
                Just("none".to_string()),
                Just("scale(0.8)".to_string()),
                Just("12px".to_string()),
                Just("0 auto".to_string()),
                Just("50%".to_string()),
            ]),
            PresentationAttr::ALL.len(),
        )
    }

    proptest! {
        #[test]
        fn prop_restoration_returns_every_attribute(values in attr_values()) {
            let surface = shared_surface();
            {
                let mut guard = surface.lock();
                for (attr, value) in PresentationAttr::ALL.iter().zip(&values) {
                    if let Some(value) = value {
                        guard.set_attr(*attr, value.clone());
                    }
                }
            }
            let before = snapshot(&surface);

            drop(PresentationOverride::apply(
                Arc::clone(&surface),
                &[
                    (PresentationAttr::Transform, "none"),
                    (PresentationAttr::Margin, "0"),
                    (PresentationAttr::Height, "auto"),
                    (PresentationAttr::MaxWidth, "210mm"),
                ],
            ));

            prop_assert_eq!(snapshot(&surface), before);
        }
    }
}
