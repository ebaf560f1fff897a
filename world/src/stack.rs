//! Ordered element stack owned by a single cell.

use crate::element::{SurfaceElement, TileElement};

/// Ordered collection of elements occupying one cell.
///
/// Order encodes vertical stacking: elements stored before the surface sit
/// below it, elements stored after sit above it. The last element of the
/// vector is the last element of the cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileStack {
    elements: Vec<TileElement>,
}

/// Borrowed view of the surface element within a stack.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceView<'a> {
    /// Position of the surface within the stack.
    pub index: usize,
    /// Surface element including its heights.
    pub element: &'a TileElement,
    /// Surface payload.
    pub surface: &'a SurfaceElement,
}

impl TileStack {
    /// Iterator over the elements from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &TileElement> {
        self.elements.iter()
    }

    /// Iterator over the elements paired with their stack positions.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &TileElement)> {
        self.elements.iter().enumerate()
    }

    /// Number of elements in the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Reports whether the stack holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element stored at the provided position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TileElement> {
        self.elements.get(index)
    }

    /// First element matching the predicate, with its position.
    pub fn find<P>(&self, mut predicate: P) -> Option<(usize, &TileElement)>
    where
        P: FnMut(&TileElement) -> bool,
    {
        self.iter_indexed().find(|(_, element)| predicate(element))
    }

    /// Locates the surface element of the cell.
    #[must_use]
    pub fn surface(&self) -> Option<SurfaceView<'_>> {
        self.iter_indexed().find_map(|(index, element)| {
            element.as_surface().map(|surface| SurfaceView {
                index,
                element,
                surface,
            })
        })
    }

    pub(crate) fn surface_mut(&mut self) -> Option<&mut TileElement> {
        self.elements
            .iter_mut()
            .find(|element| element.as_surface().is_some())
    }

    /// Inserts the element above every element whose base is not higher.
    pub(crate) fn insert(&mut self, element: TileElement) -> usize {
        let index = self
            .elements
            .iter()
            .position(|existing| existing.base_height() > element.base_height())
            .unwrap_or(self.elements.len());
        self.elements.insert(index, element);
        index
    }

    /// Detaches every element matching the predicate, returning them bottom to top.
    ///
    /// Removing an element shifts its successors down by one, so the cursor
    /// stays in place after a removal. Each element is offered to the
    /// predicate exactly once.
    pub(crate) fn remove_where<P>(&mut self, mut predicate: P) -> Vec<TileElement>
    where
        P: FnMut(&TileElement) -> bool,
    {
        let mut removed = Vec::new();
        let mut cursor = 0;
        while cursor < self.elements.len() {
            if predicate(&self.elements[cursor]) {
                removed.push(self.elements.remove(cursor));
            } else {
                cursor += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::TileStack;
    use crate::element::{ElementKind, SmallSceneryElement, SurfaceElement, TileElement};
    use landscape_core::ObjectEntryId;

    fn scenery(base: u8, price: i16) -> TileElement {
        TileElement::new(
            base,
            base + 4,
            ElementKind::SmallScenery(SmallSceneryElement {
                entry: ObjectEntryId::new(1),
                removal_price: price,
                is_tree: false,
            }),
        )
    }

    #[test]
    fn insert_keeps_elements_ordered_by_base() {
        let mut stack = TileStack::default();
        let _ = stack.insert(TileElement::surface(14, SurfaceElement::default()));
        let _ = stack.insert(scenery(20, 1));
        let below = stack.insert(scenery(4, 2));
        let level = stack.insert(scenery(14, 3));

        assert_eq!(below, 0);
        assert_eq!(level, 2, "same-base element stacks above the surface");
        let bases: Vec<u8> = stack.iter().map(TileElement::base_height).collect();
        assert_eq!(bases, vec![4, 14, 14, 20]);
        assert_eq!(stack.surface().map(|view| view.index), Some(1));
    }

    #[test]
    fn remove_where_visits_adjacent_matches_once() {
        let mut stack = TileStack::default();
        let _ = stack.insert(TileElement::surface(14, SurfaceElement::default()));
        for price in [5, 6, 7] {
            let _ = stack.insert(scenery(14, price));
        }
        let _ = stack.insert(scenery(30, 99));

        let mut offered = 0;
        let removed = stack.remove_where(|element| {
            offered += 1;
            element
                .as_small_scenery()
                .is_some_and(|item| item.removal_price < 10)
        });

        assert_eq!(offered, 5, "every element is offered exactly once");
        let prices: Vec<i16> = removed
            .iter()
            .filter_map(|element| element.as_small_scenery().map(|item| item.removal_price))
            .collect();
        assert_eq!(prices, vec![5, 6, 7]);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn find_reports_position() {
        let mut stack = TileStack::default();
        let _ = stack.insert(TileElement::surface(14, SurfaceElement::default()));
        let _ = stack.insert(scenery(16, 1));
        let found = stack.find(|element| element.as_small_scenery().is_some());
        assert_eq!(found.map(|(index, _)| index), Some(1));
        assert!(stack.get(2).is_none());
        assert!(!stack.is_empty());
    }
}
