//! # tessera-engine
//!
//! Structural editing core for rich-text trees: positions and traversal over
//! an arena tree, content-type classification, whitespace/line-break
//! restoration, caret normalization and the delete/merge engine.
//!
//! Every operation takes the [`Tree`] and an [`EditingPolicy`] explicitly;
//! the only state shared between calls is the per-root restoration guard
//! stored in the tree.
//!
//! ```
//! use tessera_engine::{EditingPolicy, Range, Tree, delete_range};
//!
//! let mut tree = Tree::from_markup("<p>Hello world</p>");
//! let policy = EditingPolicy::default();
//! let range = Range::new(
//!     &tree,
//!     tree.resolve_path("0/0:6").unwrap(),
//!     tree.resolve_path("0/0:11").unwrap(),
//! );
//! let outcome = delete_range(&mut tree, &policy, range).unwrap();
//! assert_eq!(tree.to_markup(), "<p>Hello&nbsp;</p>");
//! assert_eq!(tree.path_string(outcome.cursor), "0/0:6");
//! ```

pub mod content_type;
pub mod delete;
pub mod error;
pub mod normalize;
pub mod policy;
pub mod position;
pub mod restore;
pub mod traversal;
pub mod tree;

pub use content_type::{
    Classification, Classifier, ContentType, classify, classify_with_boundary, is_fake_br,
};
pub use delete::{DeleteOutcome, delete_backward, delete_forward, delete_range, step_range};
pub use error::EditError;
pub use normalize::{NormalizeMode, normalize};
pub use policy::{BeforeDelete, EditingPolicy, Handled};
pub use position::{Direction, Position, Range, compare_positions};
pub use restore::{Anchor, Reentrancy, RestoreReport, Restorer, prepare_update};
pub use traversal::{StopReason, Walker};
pub use tree::Tree;
pub use tree::node::{Element, NodeKind};
pub use tree::schema::{ConfiguredSchema, HtmlSchema, Schema};
pub use tree::tag::Tag;

/// Re-exported so callers can name node handles without a direct
/// dependency.
pub use indextree::NodeId;
