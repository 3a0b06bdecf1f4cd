/*!
 * Core transfer pipeline
 *
 * Validation, key derivation, staging, sniffing, and the reader/writer pair
 * that sit between the functions and the object store.
 */

pub mod keys;
pub mod reader;
pub mod result;
pub mod sniff;
pub mod staging;
pub mod validation;
pub mod writer;

pub use keys::derive_storage_key;
pub use reader::ObjectReader;
pub use result::{GatewayResponse, IngestResponse, RetrieveResponse};
pub use sniff::sniff_content_type;
pub use staging::{stage, StagedPayload};
pub use validation::{validate_object_key, validate_source_url};
pub use writer::{ObjectWriter, WritePolicy};
