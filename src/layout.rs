//! Containment layout: keeps container children inside the content region.
//!
//! The content region of a container is its bounds minus `padding` on every
//! side and minus `header_height` at the top. Child bounds are relative to the
//! container. For each child:
//!
//! ```text
//! x = clamp(x, padding, width - child.width - padding)
//! y = clamp(y, header + padding, height - child.height - padding)
//! ```
//!
//! A child larger than the region is pinned to the low edge and may overflow
//! on the far side. Before clamping, the container itself is raised to its
//! kind's minimum size. Children are clamped independently of each other, so
//! the result does not depend on their order, and clamping an in-range value
//! is a no-op, so `layout` is idempotent.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::element::Element;
use crate::geometry::clamp;
use crate::registry;

/// Output of [`layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub container: Element,
    /// Children in input order with their positions clamped.
    pub children: Vec<Element>,
}

/// Lay out `children` inside `container`.
///
/// Non-container kinds have no content region; they are returned unchanged.
#[must_use]
pub fn layout(container: &Element, children: &[Element]) -> LayoutResult {
    let mut container = container.clone();
    let mut children = children.to_vec();

    let Some(region) = registry::element_entry(container.element_type).container else {
        return LayoutResult { container, children };
    };

    container.enforce_minimum();
    let width = container.bounds.width;
    let height = container.bounds.height;

    for child in &mut children {
        let b = &mut child.bounds;
        b.x = clamp(b.x, region.padding, width - b.width - region.padding);
        b.y = clamp(
            b.y,
            region.header_height + region.padding,
            height - b.height - region.padding,
        );
    }

    LayoutResult { container, children }
}
