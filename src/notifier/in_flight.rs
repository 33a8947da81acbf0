//! Per-package gate that lets only one check run at a time

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Set of package names currently being checked
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    packages: Arc<Mutex<HashSet<String>>>,
}

/// Marks a package as being checked until dropped
#[derive(Debug)]
pub struct InFlightGuard {
    packages: Arc<Mutex<HashSet<String>>>,
    package_name: String,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim a package. Returns None if it is already being checked.
    pub fn try_start(&self, package_name: &str) -> Option<InFlightGuard> {
        let mut packages = self.packages.lock().unwrap_or_else(PoisonError::into_inner);
        if !packages.insert(package_name.to_string()) {
            return None;
        }

        Some(InFlightGuard {
            packages: Arc::clone(&self.packages),
            package_name: package_name.to_string(),
        })
    }

    #[cfg(test)]
    fn contains(&self, package_name: &str) -> bool {
        self.packages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(package_name)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.packages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.package_name);
    }
}
