// src/sanitize.rs
//
// Terminal-safe rendering of values supplied by the remote federation service

/// Strips control characters from a remote-supplied value before it is
/// written to a terminal
///
/// Federation responses are attacker-influenced; an embedded ESC sequence in
/// a `Domain` element must not reach the user's terminal verbatim.
///
/// # Arguments
/// * `value` - String to sanitize
///
/// # Returns
/// * `String` - The value without control characters
pub fn sanitize_terminal(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}
