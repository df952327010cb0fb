pub mod document_repository;
pub mod filter;
pub mod memory;
pub mod ports;

pub use document_repository::DocumentRepository;
pub use filter::{Comparison, Filter, FindOptions, Predicate, Sort, SortDirection};
pub use memory::InMemoryDocumentStore;
pub use ports::{Document, DocumentStore, Entity, Repository, RepositoryError, StoredDocument};
