use std::collections::HashMap;

/// Length of each of the two independent base-36 draws.
const SEGMENT_LEN: usize = 13;

/// Generate a session identifier: two independently drawn random base-36
/// strings of 13 characters each, concatenated.
///
/// This is an identification token, not a security credential. A client can
/// freely mint new ids — a known accuracy limitation of session-based
/// visitor counting, not a security bug.
pub fn generate_session_id() -> String {
    let mut id = String::with_capacity(SEGMENT_LEN * 2);
    id.push_str(&random_base36(SEGMENT_LEN));
    id.push_str(&random_base36(SEGMENT_LEN));
    id
}

fn random_base36(len: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..36);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}

/// A keyed session-id store with explicit get-or-create semantics.
///
/// Models the browser-side behavior (one stable id per browsing context,
/// held in sessionStorage) for embedded producers and test fixtures. The
/// key is whatever the embedder uses to distinguish browsing contexts.
/// Clearing the store is the equivalent of the browser ending the session.
#[derive(Debug, Default)]
pub struct SessionStore {
    ids: HashMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached id for `key`, generating and storing one if absent.
    pub fn get_or_create(&mut self, key: &str) -> &str {
        self.ids
            .entry(key.to_string())
            .or_insert_with(generate_session_id)
    }

    /// Drop the id for `key`, ending that context's session.
    pub fn clear(&mut self, key: &str) {
        self.ids.remove(key);
    }
}
