pub mod memory;
pub mod store;
pub mod supabase;

pub use memory::InMemoryStore;
pub use store::{ClinicStore, StoreError};
pub use supabase::SupabaseClient;
