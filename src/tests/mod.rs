mod fake;
mod utils;
