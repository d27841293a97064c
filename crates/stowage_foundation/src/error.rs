//! Error types for the Stowage system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Only checked operations produce these errors; unchecked operations
//! assume their preconditions hold.

use std::fmt;

use thiserror::Error;

use crate::entity::Entity;

/// Result type used across the storage layers.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Stowage operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records the operation that produced this error.
    ///
    /// Keeps the innermost operation if one was already recorded.
    #[must_use]
    pub fn in_operation(self, operation: &'static str) -> Self {
        if self.context.is_some() {
            return self;
        }
        self.with_context(ErrorContext::new(operation))
    }

    /// Attaches a note to the recorded context, creating an unnamed
    /// context if no operation was recorded.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(|| ErrorContext::new("unknown"))
            .notes
            .push(note.into());
        self
    }

    /// Creates a no such entity error.
    #[must_use]
    pub fn no_such_entity(entity: Entity) -> Self {
        Self::new(ErrorKind::NoSuchEntity(entity))
    }

    /// Creates a component already exists error.
    #[must_use]
    pub fn already_exists(entity: Entity, component: &'static str) -> Self {
        Self::new(ErrorKind::ComponentAlreadyExists { entity, component })
    }

    /// Creates a component does not exist error.
    #[must_use]
    pub fn does_not_exist(entity: Entity, component: &'static str) -> Self {
        Self::new(ErrorKind::ComponentDoesNotExist { entity, component })
    }

    /// Creates a component has references error.
    #[must_use]
    pub fn has_references(entity: Entity, component: &'static str, references: u32) -> Self {
        Self::new(ErrorKind::ComponentHasReferences {
            entity,
            component,
            references,
        })
    }

    /// Returns the entity this error is about.
    #[must_use]
    pub fn entity(&self) -> Entity {
        match self.kind {
            ErrorKind::NoSuchEntity(entity)
            | ErrorKind::ComponentAlreadyExists { entity, .. }
            | ErrorKind::ComponentDoesNotExist { entity, .. }
            | ErrorKind::ComponentHasReferences { entity, .. } => entity,
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The entity is not in the live set.
    #[error("no such entity: {0:?}")]
    NoSuchEntity(Entity),

    /// The entity already has a component of this type.
    #[error("component {component} already exists on {entity:?}")]
    ComponentAlreadyExists {
        /// The entity that was targeted.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },

    /// The entity has no component of this type.
    #[error("component {component} does not exist on {entity:?}")]
    ComponentDoesNotExist {
        /// The entity that was targeted.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },

    /// Outstanding handles still point at the component.
    #[error("component {component} on {entity:?} has {references} outstanding reference(s)")]
    ComponentHasReferences {
        /// The entity that was targeted.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
        /// Number of live handles at the time of the call.
        references: u32,
    },
}

/// Context about where an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// The storage operation that failed.
    pub operation: &'static str,
    /// Free-form notes added by callers further up the stack.
    pub notes: Vec<String>,
}

impl ErrorContext {
    /// Creates a context for the given operation.
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            notes: Vec::new(),
        }
    }

    /// Adds a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in {}", self.operation)?;
        for note in &self.notes {
            write!(f, "; {note}")?;
        }
        Ok(())
    }
}
