mod common;
mod pool;
mod transaction;
mod visibility;
