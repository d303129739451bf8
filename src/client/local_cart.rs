//! Device-local cart persistence, used when the server has no cart for us.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::identity::CartItem;

#[derive(Debug)]
pub enum CartStoreError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl std::fmt::Display for CartStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartStoreError::Io(e) => write!(f, "Cart storage I/O error: {}", e),
            CartStoreError::Serde(e) => write!(f, "Cart storage is corrupt: {}", e),
        }
    }
}

impl std::error::Error for CartStoreError {}

/// Synchronous key-value style storage, like a browser's localStorage.
pub trait LocalCartStore: Send + Sync {
    fn load(&self) -> Result<Vec<CartItem>, CartStoreError>;
    fn save(&self, items: &[CartItem]) -> Result<(), CartStoreError>;
}

#[derive(Default)]
pub struct MemoryCartStore {
    items: Mutex<Vec<CartItem>>,
}

impl MemoryCartStore {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }
}

impl LocalCartStore for MemoryCartStore {
    fn load(&self) -> Result<Vec<CartItem>, CartStoreError> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, items: &[CartItem]) -> Result<(), CartStoreError> {
        *self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = items.to_vec();
        Ok(())
    }
}

/// Cart stored as a JSON array in a file. A missing file is an empty cart.
pub struct JsonFileCartStore {
    path: PathBuf,
}

impl JsonFileCartStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LocalCartStore for JsonFileCartStore {
    fn load(&self) -> Result<Vec<CartItem>, CartStoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CartStoreError::Io(e)),
        };
        serde_json::from_slice(&bytes).map_err(CartStoreError::Serde)
    }

    fn save(&self, items: &[CartItem]) -> Result<(), CartStoreError> {
        let json = serde_json::to_vec(items).map_err(CartStoreError::Serde)?;
        std::fs::write(&self.path, json).map_err(CartStoreError::Io)
    }
}
