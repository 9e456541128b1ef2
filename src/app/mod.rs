pub mod routes;
pub mod server;
pub mod state;

pub use routes::router;
pub use server::PollServer;
pub use state::AppState;
