//! In-memory registry store.

use std::collections::BTreeMap;

use super::{path_components, RegistryStore, RegistryValue};
use crate::types::errors::RegistryError;

#[derive(Debug, Default, Clone, PartialEq)]
struct KeyNode {
    values: BTreeMap<String, RegistryValue>,
    subkeys: BTreeMap<String, KeyNode>,
}

/// Registry store kept entirely in memory. Subkeys enumerate in name order.
///
/// A read-only store rejects every write with `RegistryError::AccessDenied`.
#[derive(Debug, Default, Clone)]
pub struct MemoryRegistry {
    root: KeyNode,
    read_only: bool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn node(&self, path: &str) -> Result<&KeyNode, RegistryError> {
        let mut node = &self.root;
        for component in path_components(path)? {
            node = node
                .subkeys
                .get(component)
                .ok_or_else(|| RegistryError::KeyNotFound(path.to_string()))?;
        }
        Ok(node)
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut KeyNode, RegistryError> {
        let mut node = &mut self.root;
        for component in path_components(path)? {
            node = node
                .subkeys
                .get_mut(component)
                .ok_or_else(|| RegistryError::KeyNotFound(path.to_string()))?;
        }
        Ok(node)
    }

    fn check_writable(&self, path: &str) -> Result<(), RegistryError> {
        if self.read_only {
            return Err(RegistryError::AccessDenied(path.to_string()));
        }
        Ok(())
    }
}

impl RegistryStore for MemoryRegistry {
    fn create_key(&mut self, path: &str) -> Result<(), RegistryError> {
        self.check_writable(path)?;
        let mut node = &mut self.root;
        for component in path_components(path)? {
            node = node.subkeys.entry(component.to_string()).or_default();
        }
        Ok(())
    }

    fn key_exists(&self, path: &str) -> Result<bool, RegistryError> {
        match self.node(path) {
            Ok(_) => Ok(true),
            Err(RegistryError::KeyNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn set_value(&mut self, path: &str, name: &str, value: RegistryValue) -> Result<(), RegistryError> {
        self.check_writable(path)?;
        self.node_mut(path)?.values.insert(name.to_string(), value);
        Ok(())
    }

    fn get_value(&self, path: &str, name: &str) -> Result<Option<RegistryValue>, RegistryError> {
        Ok(self.node(path)?.values.get(name).cloned())
    }

    fn subkeys(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        Ok(self.node(path)?.subkeys.keys().cloned().collect())
    }

    fn delete_key(&mut self, path: &str) -> Result<(), RegistryError> {
        self.check_writable(path)?;
        let components = path_components(path)?;
        let (last, ancestors) = components
            .split_last()
            .ok_or_else(|| RegistryError::InvalidPath(path.to_string()))?;

        let mut parent = &mut self.root;
        for component in ancestors {
            parent = parent
                .subkeys
                .get_mut(*component)
                .ok_or_else(|| RegistryError::KeyNotFound(path.to_string()))?;
        }
        parent
            .subkeys
            .remove(*last)
            .map(|_| ())
            .ok_or_else(|| RegistryError::KeyNotFound(path.to_string()))
    }
}
