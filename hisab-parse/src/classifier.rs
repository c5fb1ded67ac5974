//! Bilingual intent/category table.
//!
//! Rules are evaluated top to bottom and the first phrase found anywhere in
//! the message wins, so table order (not position in the text) breaks ties.
//! Adding a phrase or a language variant is a table edit.

use hisab_core::Direction;

/// Direction plus category for a matched phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    pub direction: Direction,
    pub category: &'static str,
}

/// One `(phrase, result)` entry. Phrases are stored lowercase.
#[derive(Debug, Clone, Copy)]
pub struct PhraseRule {
    pub phrase: &'static str,
    pub intent: Intent,
}

const fn income(phrase: &'static str, category: &'static str) -> PhraseRule {
    PhraseRule {
        phrase,
        intent: Intent {
            direction: Direction::Income,
            category,
        },
    }
}

const fn expense(phrase: &'static str, category: &'static str) -> PhraseRule {
    PhraseRule {
        phrase,
        intent: Intent {
            direction: Direction::Expense,
            category,
        },
    }
}

pub const PHRASE_TABLE: &[PhraseRule] = &[
    // --- Income ---
    income("cash in", "Cash In"),
    income("ক্যাশ ইন", "Cash In"),
    income("salary", "Salary"),
    income("বেতন", "Salary"),
    income("received", "Transfer In"),
    income("পেয়েছেন", "Transfer In"),
    income("গ্রহণ", "Transfer In"),
    income("refund", "Refund"),
    income("ফেরত", "Refund"),
    income("credited", "Deposit"),
    income("জমা", "Deposit"),
    // --- Expense ---
    expense("bill", "Utilities"),
    expense("বিল", "Utilities"),
    expense("electricity", "Utilities"),
    expense("বিদ্যুৎ", "Utilities"),
    expense("recharge", "Mobile Recharge"),
    expense("রিচার্জ", "Mobile Recharge"),
    expense("top-up", "Mobile Recharge"),
    expense("cash out", "Cash Out"),
    expense("ক্যাশ আউট", "Cash Out"),
    expense("withdraw", "Cash Out"),
    expense("উত্তোলন", "Cash Out"),
    expense("send money", "Transfer"),
    expense("sent", "Transfer"),
    expense("পাঠানো", "Transfer"),
    expense("payment", "Shopping"),
    expense("পেমেন্ট", "Shopping"),
    expense("purchase", "Shopping"),
    expense("কেনাকাটা", "Shopping"),
    expense("paid", "Shopping"),
    expense("debited", "Other"),
    expense("খরচ", "Other"),
];

/// First table entry whose phrase occurs (case-insensitively) in the text
pub fn classify(text: &str) -> Option<Intent> {
    let lower = text.to_lowercase();
    PHRASE_TABLE
        .iter()
        .find(|rule| lower.contains(rule.phrase))
        .map(|rule| rule.intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_is_shopping() {
        let i = classify("Payment successful to Foodpanda").unwrap();
        assert_eq!(i.direction, Direction::Expense);
        assert_eq!(i.category, "Shopping");
    }

    #[test]
    fn test_table_order_beats_text_position() {
        // "payment" appears before "bill" in the text, but the bill rule is earlier in the table
        let i = classify("Payment of electricity bill done").unwrap();
        assert_eq!(i.category, "Utilities");

        // income rules sit above expense rules
        let i = classify("Payment received from Karim").unwrap();
        assert_eq!(i.direction, Direction::Income);
        assert_eq!(i.category, "Transfer In");
    }

    #[test]
    fn test_bengali_phrases() {
        let i = classify("আপনার অ্যাকাউন্টে ৫০০ টাকা জমা হয়েছে").unwrap();
        assert_eq!(i.direction, Direction::Income);
        assert_eq!(i.category, "Deposit");

        let i = classify("বিদ্যুৎ বিল পরিশোধ").unwrap();
        assert_eq!(i.category, "Utilities");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("CASH OUT TK 500").unwrap().category, "Cash Out");
        assert_eq!(classify("Salary Credited").unwrap().category, "Salary");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("Tk 500 to Someone"), None);
    }

    #[test]
    fn test_phrases_are_lowercase() {
        for rule in PHRASE_TABLE {
            assert_eq!(rule.phrase, rule.phrase.to_lowercase());
        }
    }
}
