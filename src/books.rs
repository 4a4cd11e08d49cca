//! Book Storage
//! Mission: Per-tenant book collections with merge-patch updates

use crate::store::StoreError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// A book in a tenant's catalog. Unknown JSON fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    pub author: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields required to create a book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub author: String,
}

/// Shallow merge patch: present fields overwrite, absent or null ones are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    pub name: Option<String>,
    pub author: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Book {
    /// Overlay `patch` onto this book. The id never changes.
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        for (key, value) in patch.extra {
            if key == "id" {
                continue;
            }
            self.extra.insert(key, value);
        }
    }
}

type Shelf = Arc<RwLock<Vec<Book>>>;

/// In-memory book storage, one shelf per tenant.
#[derive(Default)]
pub struct BookStore {
    tenants: RwLock<HashMap<String, Shelf>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection for `customer` if it has none yet.
    /// Returns true when a new collection was created.
    pub fn open_tenant(&self, customer: &str) -> bool {
        if self.tenants.read().contains_key(customer) {
            return false;
        }
        let mut tenants = self.tenants.write();
        if tenants.contains_key(customer) {
            return false;
        }
        tenants.insert(customer.to_string(), Shelf::default());
        info!(customer, "📚 Opened tenant collection");
        true
    }

    pub fn has_tenant(&self, customer: &str) -> bool {
        self.tenants.read().contains_key(customer)
    }

    /// All books of a tenant; empty for an unknown tenant.
    pub fn list(&self, customer: &str) -> Vec<Book> {
        self.shelf(customer)
            .map(|shelf| shelf.read().clone())
            .unwrap_or_default()
    }

    pub fn add(&self, customer: &str, book: NewBook) -> Book {
        let book = Book {
            id: Uuid::new_v4(),
            name: book.name,
            author: book.author,
            extra: Map::new(),
        };

        let shelf = self.shelf_or_create(customer);
        shelf.write().push(book.clone());
        debug!(customer, id = %book.id, "Book added");
        book
    }

    pub fn get(&self, customer: &str, id: &str) -> Option<Book> {
        let id = Uuid::parse_str(id).ok()?;
        let shelf = self.shelf(customer)?;
        let books = shelf.read();
        books.iter().find(|book| book.id == id).cloned()
    }

    pub fn update(&self, customer: &str, id: &str, patch: BookPatch) -> Result<Book, StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;
        let shelf = self.shelf(customer).ok_or(StoreError::NotFound)?;
        let mut books = shelf.write();
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(StoreError::NotFound)?;
        book.apply(patch);
        debug!(customer, id = %id, "Book updated");
        Ok(book.clone())
    }

    pub fn delete(&self, customer: &str, id: &str) -> Result<(), StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;
        let shelf = self.shelf(customer).ok_or(StoreError::NotFound)?;
        let mut books = shelf.write();
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or(StoreError::NotFound)?;
        books.remove(index);
        debug!(customer, id = %id, "Book deleted");
        Ok(())
    }

    fn shelf(&self, customer: &str) -> Option<Shelf> {
        self.tenants.read().get(customer).cloned()
    }

    fn shelf_or_create(&self, customer: &str) -> Shelf {
        if let Some(shelf) = self.shelf(customer) {
            return shelf;
        }
        self.tenants
            .write()
            .entry(customer.to_string())
            .or_default()
            .clone()
    }
}
