// Anchor tracking: positions and numbering of cross-reference targets,
// derived from layout results and kept per document by the service.

pub mod handlers;
pub mod store;
pub mod sync;
pub mod tracker;

pub use store::AnchorStore;
pub use tracker::{
    AnchorPosition, AnchorReference, AnchorTracker, AnchorType, CrossReference, NewAnchor,
    ReferenceKind, ResolvedReference,
};
