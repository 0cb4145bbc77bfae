mod env;
mod services;

pub use services::RestShellService;
