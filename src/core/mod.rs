pub mod connection;
pub mod external_ip;
pub mod filters;
pub mod history;
pub mod iface;
pub mod model;
pub mod probe;
pub mod process;
pub mod sampler;
pub mod scheduler;
pub mod selection;
pub mod utils;
