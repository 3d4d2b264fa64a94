use uuid::Uuid;

/// Generate an opaque 128-bit resource ID.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}
