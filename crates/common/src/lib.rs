/**
 * Model-backed text generation: the backend
 *  seam, the chunk orchestrator, prompts and
 *  tolerant parsing of model replies.
 */
pub mod generation;
/**
 * Single-owner access decisions.
 */
pub mod guard;
/**
 * Display names, storage keys and
 *  sibling-unique naming.
 */
pub mod naming;
/**
 * Doubles for tests that need a model
 *  without running one.
 */
pub mod testkit;
/**
 * Sentence-aligned chunking.
 */
pub mod text;
/**
 * Nested views built from flat parent links.
 */
pub mod tree;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;
/**
 * Directory and file operations over the
 *  record store and blob storage seams.
 */
pub mod workspace;

pub mod prelude {
    pub use crate::generation::{
        GenerationBackend, GenerationError, GenerationResponse, Orchestrator,
    };
    pub use crate::guard::{authorize, Decision};
    pub use crate::naming::{normalize, StorageKey};
    pub use crate::tree::TreeNode;
    pub use crate::version::build_info;
    pub use crate::workspace::{
        BlobStorage, Directory, File, Store, User, Workspace, WorkspaceError,
    };
}
