//! Immutable scene nodes.
//!
//! An [`Element`] is either a leaf holding a draw procedure or a group of child elements,
//! plus the transform accumulated so far. Transforming an element yields a new element
//! that shares the procedure or children with the original.

use std::fmt;
use std::sync::Arc;

use quill_core::{DrawTarget, DrawingContext, Result, Transform2D, Transformable};

/// Procedure that issues path and paint commands on a fresh context.
pub type DrawProc = Arc<dyn Fn(&mut dyn DrawingContext) -> Result<()> + Send + Sync>;

#[derive(Clone)]
pub enum ElementKind {
    Leaf(DrawProc),
    /// Children in paint order.
    Group(Arc<[Element]>),
}

#[derive(Clone)]
pub struct Element {
    kind: ElementKind,
    matrix: Transform2D,
}

impl Element {
    /// A leaf element with an identity transform.
    pub fn new<F>(draw: F) -> Self
    where
        F: Fn(&mut dyn DrawingContext) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            kind: ElementKind::Leaf(Arc::new(draw)),
            matrix: Transform2D::identity(),
        }
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group(_))
    }

    /// Children of a group, empty for a leaf.
    pub fn children(&self) -> &[Element] {
        match &self.kind {
            ElementKind::Group(children) => children,
            ElementKind::Leaf(_) => &[],
        }
    }

    /// Draw this element and, for a group, all its descendants onto `target`.
    ///
    /// A leaf gets a new context whose transform is the element's matrix. A group draws
    /// each child with `group.matrix · child.matrix` and stops at the first error.
    pub fn draw(&self, target: &mut dyn DrawTarget) -> Result<()> {
        match &self.kind {
            ElementKind::Leaf(draw) => {
                let mut ctx = target.new_context()?;
                ctx.set_matrix(self.matrix);
                draw(&mut *ctx)
            }
            ElementKind::Group(children) => {
                for child in children.iter() {
                    child
                        .set_matrix(self.matrix.then(&child.matrix))
                        .draw(target)?;
                }
                Ok(())
            }
        }
    }
}

impl Transformable for Element {
    fn matrix(&self) -> Transform2D {
        self.matrix
    }

    fn set_matrix(&self, matrix: Transform2D) -> Self {
        Self {
            kind: self.kind.clone(),
            matrix,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        match &self.kind {
            ElementKind::Leaf(_) => s.field("kind", &"leaf"),
            ElementKind::Group(children) => s.field("children", children),
        };
        s.field("matrix", &self.matrix).finish()
    }
}

/// Group `elements` with an identity transform; they paint in the given order.
pub fn group(elements: impl IntoIterator<Item = Element>) -> Element {
    Element {
        kind: ElementKind::Group(elements.into_iter().collect()),
        matrix: Transform2D::identity(),
    }
}
