//! Durable state owned by the ingest loop.
//!
//! ```text
//! hash.bin     # 16-byte fingerprints, append-only
//! quotes.txt   # "label: text\n\n" records, append-only
//! ```

pub mod fingerprints;
pub mod quotes;

pub use fingerprints::FingerprintStore;
pub use quotes::QuoteLog;
