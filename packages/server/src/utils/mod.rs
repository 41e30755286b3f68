pub mod hash;
pub mod retry;
