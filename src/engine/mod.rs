//! Unreal Engine introspection layer
//!
//! This module holds what the name core knows about the engine itself:
//! the per-build structural quirks, the reflection flag domains, and the
//! FName resolver that every later generator stage depends on.

/// Build-specific structural settings
pub mod config;

/// Reflection flag domains (property, function, object, class, class-cast, field-class)
pub mod flags;

/// Mapping-file property type ids
pub mod mappings;

/// FName handles, name buffers and the resolver session
pub mod name;
