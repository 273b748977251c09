//! Capability registry.
//!
//! Entries are kept per kind in registration order; that order is what the
//! listing operations return. Mutation is only possible on the
//! [`RegistryBuilder`], so a built [`Registry`] is read-only for the rest of
//! the process.

use indexmap::IndexMap;

use super::{CapabilityDescriptor, CapabilityKind, Handler};
use crate::error::{ProtocolError, RegistryError};

/// A descriptor together with the handler bound to it.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    descriptor: CapabilityDescriptor,
    handler: Handler,
}

impl RegistryEntry {
    #[must_use]
    pub const fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn handler(&self) -> &Handler {
        &self.handler
    }
}

type Table = IndexMap<String, RegistryEntry>;

#[derive(Debug, Default)]
struct Tables {
    tools: Table,
    resources: Table,
    prompts: Table,
}

impl Tables {
    const fn get(&self, kind: CapabilityKind) -> &Table {
        match kind {
            CapabilityKind::Tool => &self.tools,
            CapabilityKind::Resource => &self.resources,
            CapabilityKind::Prompt => &self.prompts,
        }
    }

    fn get_mut(&mut self, kind: CapabilityKind) -> &mut Table {
        match kind {
            CapabilityKind::Tool => &mut self.tools,
            CapabilityKind::Resource => &mut self.resources,
            CapabilityKind::Prompt => &mut self.prompts,
        }
    }
}

/// Collects registrations during server construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    tables: Tables,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `descriptor` for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateIdentifier`] if `(kind, identifier)`
    /// is already registered, and [`RegistryError::KindMismatch`] if the
    /// handler serves a different kind.
    pub fn register(
        &mut self,
        kind: CapabilityKind,
        descriptor: CapabilityDescriptor,
        handler: Handler,
    ) -> Result<&mut Self, RegistryError> {
        if handler.kind() != kind {
            return Err(RegistryError::KindMismatch {
                kind,
                identifier: descriptor.identifier().to_string(),
                handler_kind: handler.kind(),
            });
        }

        let table = self.tables.get_mut(kind);
        if table.contains_key(descriptor.identifier()) {
            return Err(RegistryError::DuplicateIdentifier {
                kind,
                identifier: descriptor.identifier().to_string(),
            });
        }

        tracing::debug!(
            kind = %kind,
            identifier = descriptor.identifier(),
            "Registered capability"
        );
        table.insert(
            descriptor.identifier().to_string(),
            RegistryEntry {
                descriptor,
                handler,
            },
        );
        Ok(self)
    }

    /// Registers a handler under the descriptor it reports for itself.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub fn add(&mut self, handler: Handler) -> Result<&mut Self, RegistryError> {
        let descriptor = handler.descriptor();
        self.register(handler.kind(), descriptor, handler)
    }

    /// Freezes the registrations.
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            tables: self.tables,
        }
    }
}

/// The read-only capability table.
#[derive(Debug, Default)]
pub struct Registry {
    tables: Tables,
}

impl Registry {
    /// Resolves `(kind, identifier)` to its entry.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownCapability`] when nothing is
    /// registered under that identifier.
    pub fn lookup(
        &self,
        kind: CapabilityKind,
        identifier: &str,
    ) -> Result<&RegistryEntry, ProtocolError> {
        self.tables
            .get(kind)
            .get(identifier)
            .ok_or_else(|| ProtocolError::UnknownCapability {
                kind,
                identifier: identifier.to_string(),
            })
    }

    /// Descriptors of `kind`, in registration order.
    pub fn list(&self, kind: CapabilityKind) -> impl Iterator<Item = &CapabilityDescriptor> + '_ {
        self.tables.get(kind).values().map(RegistryEntry::descriptor)
    }

    /// Number of capabilities registered for `kind`.
    #[must_use]
    pub fn len(&self, kind: CapabilityKind) -> usize {
        self.tables.get(kind).len()
    }

    /// Returns `true` if nothing at all is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        CapabilityKind::ALL.iter().all(|&kind| self.len(kind) == 0)
    }
}
