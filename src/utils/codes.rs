use chrono::Utc;
use rand::{thread_rng, Rng};

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const SESSION_CODE_PREFIX: &str = "SES";
pub const APPLICATION_NUMBER_PREFIX: &str = "APP";

/// Upper-case base-36 rendering of `n`.
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

pub fn random_base36(length: usize) -> String {
    let mut rng = thread_rng();
    (0..length)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `<prefix>-<base36 millis>-<base36 random>`. Unique only with high
/// probability; callers check the store before using it.
pub fn generate_code(prefix: &str, suffix_len: usize) -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{}-{}-{}", prefix, to_base36(millis), random_base36(suffix_len))
}

pub fn generate_session_code() -> String {
    generate_code(SESSION_CODE_PREFIX, 6)
}

pub fn generate_application_number() -> String {
    generate_code(APPLICATION_NUMBER_PREFIX, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "ZZ");
    }

    #[test]
    fn session_code_has_three_parts() {
        let code = generate_session_code();
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SES");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[1]
            .chars()
            .chain(parts[2].chars())
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn application_number_suffix_is_four_chars() {
        let number = generate_application_number();
        assert!(number.starts_with("APP-"));
        assert_eq!(number.rsplit('-').next().map(str::len), Some(4));
    }
}
