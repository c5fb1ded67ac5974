use std::borrow::Cow;

const BENGALI_ZERO: u32 = 0x09E6;
const BENGALI_NINE: u32 = 0x09EF;

fn ascii_digit(c: char) -> Option<char> {
    let cp = c as u32;
    if (BENGALI_ZERO..=BENGALI_NINE).contains(&cp) {
        char::from_digit(cp - BENGALI_ZERO, 10)
    } else {
        None
    }
}

/// Replace Bengali digits (০-৯) with their ASCII counterparts.
/// Borrows when the text has none.
pub fn transliterate_digits(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| ascii_digit(c).is_some()) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().map(|c| ascii_digit(c).unwrap_or(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bengali_digits() {
        assert_eq!(transliterate_digits("৫০০ টাকা"), "500 টাকা");
        assert_eq!(transliterate_digits("০১২৩৪৫৬৭৮৯"), "0123456789");
    }

    #[test]
    fn test_ascii_passthrough_borrows() {
        assert!(matches!(transliterate_digits("Tk 500"), Cow::Borrowed(_)));
        assert!(matches!(transliterate_digits(""), Cow::Borrowed(_)));
    }
}
