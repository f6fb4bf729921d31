mod spot_handler;

pub use spot_handler::*;
