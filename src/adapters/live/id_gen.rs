//! UUID-backed identifiers.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Issues random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveIdGenerator;

impl IdGenerator for LiveIdGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
