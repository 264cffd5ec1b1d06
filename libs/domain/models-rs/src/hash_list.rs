// [libs/domain/models-rs/src/hash_list.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// One target hash, plaintext `None` until the Result Ingestor (C9) cracks it.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashItem {
    pub id: String,
    pub hash_list_id: String,
    pub hash_value: String,
    pub salt: Option<String>,
    pub plaintext: Option<String>,
    pub cracked_at: Option<String>,
}

impl HashItem {
    pub fn is_cracked(&self) -> bool {
        self.plaintext.is_some()
    }
}

/// Ordered container of `HashItem`s bound to a single hashcat hash-type
/// (e.g. `0` for MD5, `1000` for NTLM). `uncracked_count` is a cached
/// counter kept in lockstep with crack ingestion (P2) rather than
/// recomputed by scanning `items` on every read.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashList {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub hash_type_id: i32,
    #[typeshare(serialized_as = "number")]
    pub uncracked_count: u64,
}
