//! Application session: the set of named maps and which one is active.

use crate::composite::CompositeMap;
use crate::errors::SessionError;
use crate::log::debug;

/// Named composite maps with at most one active
#[derive(Debug)]
pub struct Session<D> {
    maps: Vec<(String, CompositeMap<D>)>,
    active: Option<usize>,
}

impl<D> Default for Session<D> {
    fn default() -> Self {
        Session {
            maps: Vec::new(),
            active: None,
        }
    }
}

impl<D> Session<D> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.maps.iter().position(|(n, _)| n == name)
    }

    /// Add or replace a map; returns the one it replaced
    pub fn insert(&mut self, name: impl Into<String>, map: CompositeMap<D>) -> Option<CompositeMap<D>> {
        let name = name.into();
        match self.position(&name) {
            Some(pos) => Some(std::mem::replace(&mut self.maps[pos].1, map)),
            None => {
                self.maps.push((name, map));
                None
            }
        }
    }

    /// Remove a map; the session has no active map if it was active
    pub fn remove(&mut self, name: &str) -> Option<CompositeMap<D>> {
        let pos = self.position(name)?;
        self.active = match self.active {
            Some(active) if active == pos => None,
            Some(active) if active > pos => Some(active - 1),
            other => other,
        };
        Some(self.maps.remove(pos).1)
    }

    pub fn activate(&mut self, name: &str) -> Result<(), SessionError> {
        let pos = self.position(name).ok_or_else(|| SessionError::UnknownMap {
            name: name.to_string(),
        })?;
        debug!(name, "activated map");
        self.active = Some(pos);
        Ok(())
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|pos| self.maps[pos].0.as_str())
    }

    pub fn active(&self) -> Option<&CompositeMap<D>> {
        self.active.map(|pos| &self.maps[pos].1)
    }

    pub fn active_mut(&mut self) -> Option<&mut CompositeMap<D>> {
        self.active.map(|pos| &mut self.maps[pos].1)
    }

    pub fn get(&self, name: &str) -> Option<&CompositeMap<D>> {
        self.position(name).map(|pos| &self.maps[pos].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CompositeMap<D>> {
        self.position(name).map(|pos| &mut self.maps[pos].1)
    }

    /// Map names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.iter().map(|(n, _)| n.as_str())
    }
}
