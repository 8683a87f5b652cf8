pub mod board_store;
pub mod db;

pub use board_store::BoardStore;
