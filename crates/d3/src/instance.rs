//! Problem instances.

use crate::boundary::Container;
use crate::geometry::Item;
use rkpack_core::{Error, Result};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An item type with a multiplicity, as found in instance files.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemSpec {
    /// Identifier in the source file (informational).
    pub id: usize,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Depth.
    pub depth: f64,
    /// Number of identical copies (values below 1 count as 1).
    pub quantity: usize,
    /// Which source axis (width, height, depth) may stand vertical.
    pub vert_ok: [bool; 3],
}

impl ItemSpec {
    /// Creates a single-copy spec.
    pub fn new(id: usize, width: f64, height: f64, depth: f64) -> Self {
        Self {
            id,
            width,
            height,
            depth,
            quantity: 1,
            vert_ok: [true; 3],
        }
    }

    /// Sets the quantity.
    pub fn with_quantity(mut self, quantity: usize) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the vertical-axis permissions.
    pub fn with_vert_ok(mut self, vert_ok: [bool; 3]) -> Self {
        self.vert_ok = vert_ok;
        self
    }
}

/// A container loading instance: one container and the items to load.
///
/// Read-only once built; every evaluation of a run borrows it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instance {
    name: String,
    container: Container,
    items: Vec<Item>,
}

impl Instance {
    /// Creates an instance from already expanded items.
    pub fn new(name: impl Into<String>, container: Container, items: Vec<Item>) -> Self {
        Self {
            name: name.into(),
            container,
            items,
        }
    }

    /// Creates an instance by expanding quantities.
    ///
    /// Copies are laid out in spec order and renumbered `0..n`.
    pub fn from_specs(name: impl Into<String>, container: Container, specs: &[ItemSpec]) -> Self {
        let items = specs
            .iter()
            .flat_map(|spec| std::iter::repeat(spec).take(spec.quantity.max(1)))
            .enumerate()
            .map(|(id, spec)| {
                Item::new(id, spec.width, spec.height, spec.depth).with_vert_ok(spec.vert_ok)
            })
            .collect();
        Self::new(name, container, items)
    }

    /// Returns the instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the container.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Returns the items.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the summed volume of all items.
    pub fn total_item_volume(&self) -> f64 {
        self.items.iter().map(Item::volume).sum()
    }

    /// Checks container and item dimensions and id uniqueness.
    pub fn validate(&self) -> Result<()> {
        self.container.validate()?;

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.validate()?;
            if !seen.insert(item.id()) {
                return Err(Error::InvalidInstance(format!(
                    "duplicate item id {} in '{}'",
                    item.id(),
                    self.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_specs_expands_quantities() {
        let specs = vec![
            ItemSpec::new(10, 1.0, 2.0, 3.0).with_quantity(3),
            ItemSpec::new(20, 4.0, 4.0, 4.0).with_quantity(0),
            ItemSpec::new(30, 2.0, 2.0, 2.0),
        ];
        let instance = Instance::from_specs("demo", Container::new(10.0, 10.0, 10.0), &specs);

        assert_eq!(instance.len(), 5);
        let ids: Vec<usize> = instance.items().iter().map(Item::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(instance.items()[3].width(), 4.0);
        assert_relative_eq!(instance.total_item_volume(), 3.0 * 6.0 + 64.0 + 8.0);
        assert!(instance.validate().is_ok());
    }

    #[test]
    fn test_from_specs_keeps_vert_ok() {
        let specs = vec![
            ItemSpec::new(0, 1.0, 2.0, 3.0)
                .with_quantity(2)
                .with_vert_ok([false, true, false]),
            ItemSpec::new(1, 2.0, 2.0, 2.0),
        ];
        let instance = Instance::from_specs("upright", Container::new(5.0, 5.0, 5.0), &specs);

        assert_eq!(instance.items()[0].vert_ok(), [false, true, false]);
        assert_eq!(instance.items()[1].vert_ok(), [false, true, false]);
        assert_eq!(instance.items()[2].vert_ok(), [true; 3]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let items = vec![Item::new(1, 1.0, 1.0, 1.0), Item::new(1, 2.0, 2.0, 2.0)];
        let instance = Instance::new("dup", Container::new(5.0, 5.0, 5.0), items);
        assert!(matches!(instance.validate(), Err(Error::InvalidInstance(_))));
    }

    #[test]
    fn test_invalid_parts_rejected() {
        let bad_container = Instance::new("c", Container::new(0.0, 5.0, 5.0), Vec::new());
        assert!(matches!(bad_container.validate(), Err(Error::InvalidBoundary(_))));

        let bad_item = Instance::new(
            "i",
            Container::new(5.0, 5.0, 5.0),
            vec![Item::new(0, 1.0, -1.0, 1.0)],
        );
        assert!(matches!(bad_item.validate(), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_empty_instance() {
        let instance = Instance::new("empty", Container::new(5.0, 5.0, 5.0), Vec::new());
        assert!(instance.is_empty());
        assert!(instance.validate().is_ok());
        assert_eq!(instance.total_item_volume(), 0.0);
    }
}
