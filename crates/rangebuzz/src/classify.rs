use core::fmt;

/// The classification of a single integer.
///
/// Rendered through [`fmt::Display`] as the text that appears in a response
/// body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Divisible by 3 but not by 5.
    Fizz,
    /// Divisible by 5 but not by 3.
    Buzz,
    /// Divisible by both 3 and 5.
    FizzBuzz,
    /// Divisible by neither; rendered as its decimal text.
    Number(i64),
}

impl Classification {
    /// Classifies `n`. Total over every `i64`, including negatives and zero.
    pub const fn of(n: i64) -> Self {
        match (n % 3 == 0, n % 5 == 0) {
            (true, true) => Self::FizzBuzz,
            (true, false) => Self::Fizz,
            (false, true) => Self::Buzz,
            (false, false) => Self::Number(n),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fizz => f.write_str("Fizz"),
            Self::Buzz => f.write_str("Buzz"),
            Self::FizzBuzz => f.write_str("FizzBuzz"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Maps one integer to its display string.
pub fn classify(n: i64) -> String {
    Classification::of(n).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_first_fifteen() {
        let got: Vec<String> = (1..=15).map(classify).collect();
        assert_eq!(
            got,
            [
                "1", "2", "Fizz", "4", "Buzz", "Fizz", "7", "8", "Fizz", "Buzz", "11", "Fizz",
                "13", "14", "FizzBuzz"
            ]
        );
    }

    #[test]
    fn classification_matches_modulo_rule() {
        for n in -300..=300_i64 {
            let expected = if n % 15 == 0 {
                "FizzBuzz".to_string()
            } else if n % 3 == 0 {
                "Fizz".to_string()
            } else if n % 5 == 0 {
                "Buzz".to_string()
            } else {
                n.to_string()
            };
            assert_eq!(classify(n), expected, "n = {n}");
        }
    }

    #[test]
    fn zero_is_fizzbuzz() {
        assert_eq!(Classification::of(0), Classification::FizzBuzz);
    }

    #[test]
    fn negatives_keep_their_sign() {
        assert_eq!(classify(-1), "-1");
        assert_eq!(classify(-3), "Fizz");
        assert_eq!(classify(-10), "Buzz");
        assert_eq!(classify(-30), "FizzBuzz");
    }

    #[test]
    fn extremes_do_not_overflow() {
        // i64::MAX = 9223372036854775807 (divisible by 7, not by 3 or 5)
        assert_eq!(classify(i64::MAX), i64::MAX.to_string());
        // i64::MIN = -9223372036854775808 (a power of two)
        assert_eq!(classify(i64::MIN), i64::MIN.to_string());
    }
}
