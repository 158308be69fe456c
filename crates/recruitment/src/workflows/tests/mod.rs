mod common;
mod finalize;
