//! Dumper-7 name core: FName resolution and reflection flag classification
//!
//! This library turns the opaque `FName` handles found in the memory of an
//! Unreal Engine process into stable strings, and decodes the flag words the
//! engine stores on its reflected properties, functions, objects and classes.
//!
//! # Architecture
//!
//! - **Platform Layer**: The memory-read and module-lookup interfaces this core consumes
//! - **Engine Layer**: Build quirks (`EngineVariantConfig`), flag domains and the FName resolver
//! - **Offset Finder**: The scanning collaborator used to auto-detect name functions
//! - **Managers**: Per-session bookkeeping such as valid-name collision detection
//! - **Utils**: Identifier sanitisation and small numeric helpers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod platform;
pub mod engine;
pub mod offset_finder;
pub mod managers;
pub mod utils;

// Re-export commonly used types
pub use engine::config::EngineVariantConfig;
pub use engine::flags::{
    ClassCastFlags, ClassFlags, FieldClassId, FlagDomain, FunctionFlags, ObjectFlags, PropertyFlags,
};
pub use engine::mappings::MappingsType;
pub use engine::name::{
    BindFailure, BindState, ExplicitOverride, NameHandle, NameInit, NameResolver, NameStrategyKind, ResolvedName,
    UnboundResolver,
};
pub use managers::CollisionTracker;
pub use offset_finder::{NameFunctionScanner, SignatureScanner, SignatureSet};
pub use platform::{MemoryReader, Platform};
pub use utils::naming::to_valid_string;

use engine::name::InitPath;

/// Result type used throughout the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for the name core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Platform-specific error
    #[error("Platform error: {0}")]
    Platform(#[from] platform::PlatformError),

    /// A heuristic did not produce a candidate
    #[error("Failed to find offset for {name}: {reason}")]
    OffsetNotFound {
        /// Name of the offset (e.g., "AppendString")
        name: String,
        /// Why it wasn't found
        reason: String,
    },

    /// Invalid offset
    #[error("Invalid offset 0x{offset:X} for {name}: {validation_error}")]
    InvalidOffset {
        /// The name of what we were looking for
        name: String,
        /// The offset that failed validation
        offset: usize,
        /// Why validation failed
        validation_error: String,
    },

    /// No name resolution strategy could be bound
    #[error("FName initialization failed ({path}): {source}")]
    Bind {
        /// The initialization path that was attempted last
        path: InitPath,
        /// Why binding failed
        #[source]
        source: Box<Error>,
    },

    /// Two different raw names sanitised to the same identifier
    #[error("Valid name '{valid}' produced by both '{existing}' and '{incoming}'")]
    NameCollision {
        /// The colliding identifier
        valid: String,
        /// Raw name registered first
        existing: String,
        /// Raw name that collided
        incoming: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging for the library
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dumper_7_names=info"))
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();
}
