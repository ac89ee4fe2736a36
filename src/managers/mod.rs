// LinkStash state managers
// Managers own persisted state: the bookmark collection.

pub mod bookmark_store;
