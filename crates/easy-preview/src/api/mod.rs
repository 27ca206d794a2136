// Public API types module
//
// Option structs consumed by the preview components. They follow the builder
// pattern and deserialize from JSON with camelCase keys.

pub mod load_policy;
pub mod share_options;

pub use load_policy::{DEFAULT_LOAD_TIMEOUT_MS, DEFAULT_SETTLE_DELAY_MS, LoadPolicy};
pub use share_options::ShareOptions;
