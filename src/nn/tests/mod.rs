mod common;
mod layer_pool;
