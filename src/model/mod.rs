//! # Property Graph Model
//!
//! The entities the `Graph` arena owns: nodes, edges and their property
//! stores, plus the `Path` values traversals hand back.
//!
//! Design rule: entities never hold references to each other, only ids.
//! Cross-entity work (linking, cascade removal) belongs to `Graph`.

pub mod node;
pub mod edge;
pub mod path;
pub mod property_map;

pub use node::{Node, NodeId, Incidence};
pub use edge::{Edge, EdgeId};
pub use path::{Path, PathStep};
pub use property_map::{PropertyStore, PropertyMap};
