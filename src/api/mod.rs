mod handlers;
mod server;
mod state;

pub use server::ApiServer;
pub use state::ApiState;
