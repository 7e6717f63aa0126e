use rand::Rng;

/// A fresh 24 hex character business identifier.
pub(crate) fn new_object_id() -> String {
    let bytes: [u8; 12] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
