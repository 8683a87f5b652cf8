pub mod ai_gateway;
pub mod board_service;

pub use ai_gateway::{AiGateway, GeminiGateway};
pub use board_service::{BoardLocks, BoardService};
