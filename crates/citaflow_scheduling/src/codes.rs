// --- File: crates/citaflow_scheduling/src/codes.rs ---
//! Attendance-code generation.

use rand::Rng;

/// Generate a random numeric attendance code of the given length.
///
/// Uniqueness across appointments is not enforced; at the configured lengths
/// the collision probability is accepted as negligible.
pub fn generate_attendance_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_the_requested_length_and_only_digits() {
        for length in [4, 6, 8] {
            let code = generate_attendance_code(length);
            assert_eq!(code.len(), length);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
