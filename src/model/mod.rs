pub mod api;
pub mod common;
pub mod db;
pub mod gate;
pub mod ledger;
pub mod mongodb;
pub mod store;
