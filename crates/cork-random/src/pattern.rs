use rand::Rng;

use crate::generator::SeededGenerator;

const DIGITS: &[u8] = b"0123456789";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALNUM: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Alphabet drawn from for a pattern character, if it is a wildcard.
fn alphabet(c: char) -> Option<&'static [u8]> {
    match c {
        '#' => Some(DIGITS),
        '$' => Some(UPPER),
        '*' => Some(ALNUM),
        _ => None,
    }
}

impl SeededGenerator {
    /// Fill in `pattern`: `#` becomes a digit, `$` an uppercase letter and
    /// `*` either. Everything else is copied through.
    ///
    /// Each wildcard takes exactly one draw, left to right.
    pub fn random_string(&mut self, pattern: &str) -> String {
        pattern
            .chars()
            .map(|c| match alphabet(c) {
                Some(set) => char::from(set[self.rng.random_range(0..set.len())]),
                None => c,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_plate(s: &str) -> bool {
        let b = s.as_bytes();
        b.len() == 5
            && b[0].is_ascii_digit()
            && b[1].is_ascii_digit()
            && b[2] == b'-'
            && b[3].is_ascii_uppercase()
            && b[4].is_ascii_uppercase()
    }

    #[test]
    fn plate_pattern_shape() {
        let mut prnd = SeededGenerator::from_u64(42);
        for _ in 0..200 {
            let s = prnd.random_string("##-$$");
            assert!(matches_plate(&s), "bad output {s:?}");
        }
    }

    #[test]
    fn same_seed_same_literal() {
        let first = SeededGenerator::from_u64(42).random_string("##-$$");
        for _ in 0..10 {
            assert_eq!(SeededGenerator::from_u64(42).random_string("##-$$"), first);
        }
    }

    #[test]
    fn seed_42_literal_is_pinned() {
        // Fails if the rand stream changes underneath us.
        assert_eq!(SeededGenerator::from_u64(42).random_string("##-$$"), "15-GO");
    }

    #[test]
    fn literals_pass_through() {
        let mut prnd = SeededGenerator::from_u64(5);
        assert_eq!(prnd.random_string(""), "");
        assert_eq!(prnd.random_string("abc-é/"), "abc-é/");

        let s = prnd.random_string("ID:****");
        assert!(s.starts_with("ID:"));
        assert!(s[3..].bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
    }

    #[test]
    fn one_draw_per_wildcard() {
        // Literal characters consume nothing, so interleaving them must not
        // change the substituted characters.
        let plain = SeededGenerator::from_u64(8).random_string("#$*#");
        let spaced = SeededGenerator::from_u64(8).random_string("#-$-*-#");
        let stripped: String = spaced.chars().filter(|c| *c != '-').collect();
        assert_eq!(plain, stripped);

        // The stream continues from where the pattern left off.
        let mut a = SeededGenerator::from_u64(8);
        a.random_string("##");
        let tail = a.random_string("$$");
        let whole = SeededGenerator::from_u64(8).random_string("##$$");
        assert_eq!(&whole[2..], tail);
    }
}
