use crate::session::random_token;

/// 16 bytes of OS randomness, URL-safe base64 without padding (22 chars).
const STATE_BYTES: usize = 16;

/// Create a fresh anti-forgery token for one authorization round-trip.
///
/// # Errors
/// Returns an error if the OS random source is unavailable.
pub fn generate_state() -> Result<String, rand::Error> {
    random_token::<STATE_BYTES>()
}

/// Compare without short-circuiting on the first differing byte.
pub(super) fn states_match(received: &str, stored: &str) -> bool {
    let (a, b) = (received.as_bytes(), stored.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_states_do_not_collide() {
        let states: HashSet<String> = (0..1000).map(|_| generate_state().unwrap()).collect();
        assert_eq!(states.len(), 1000);
    }

    #[test]
    fn generated_state_is_url_safe() {
        let state = generate_state().unwrap();
        assert_eq!(state.len(), 22);
        assert!(state
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn states_match_requires_exact_equality() {
        assert!(states_match("abc", "abc"));
        assert!(!states_match("abc", "abd"));
        assert!(!states_match("abc", "abcd"));
        assert!(!states_match("", "abc"));
        assert!(states_match("", ""));
    }
}
