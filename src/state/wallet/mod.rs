pub mod encryption;
pub mod errors;
pub mod secret_store;
pub mod wallet_record;
