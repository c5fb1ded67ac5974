use chrono::NaiveDate;
use hisab_core::Direction;
use hisab_parse::insights::{HIGH_VALUE, MANUAL_AMOUNT, POSITIVE_CASH_FLOW, RECURRING_BILL};
use hisab_parse::{parse_local, LocalParser};

const FOODPANDA: &str =
    "Payment successful to Foodpanda. Amount BDT 1,250.00. TrxID 8FH5G6H7. 27/12/2025";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
}

#[test]
fn test_foodpanda_payment() {
    let r = parse_local(FOODPANDA, today());
    let f = &r.fields;

    assert_eq!(f.amount.unwrap().to_string(), "1250.00");
    assert!(f.merchant.as_deref().unwrap().starts_with("Foodpanda"));
    assert_eq!(f.transaction_id.as_deref(), Some("8FH5G6H7"));
    assert_eq!(f.date.unwrap().to_string(), "2025-12-27");
    assert_eq!(f.direction, Some(Direction::Expense));
    assert_eq!(f.category.as_deref(), Some("Shopping"));
    assert!(r.confidence >= 90, "confidence {}", r.confidence);

    // below the high-value threshold, not income, not a bill, amount present
    assert!(!r.insights.iter().any(|i| i == HIGH_VALUE));
    assert!(r.insights.is_empty(), "unexpected insights: {:?}", r.insights);
}

#[test]
fn test_bengali_amount() {
    let r = parse_local("৫০০ টাকা", today());
    assert_eq!(r.fields.amount.unwrap().to_string(), "500");
}

#[test]
fn test_bengali_transfer_with_tk_style_transaction_id() {
    let r = parse_local("৫০০ টাকা পাঠানো হয়েছে। TrxID TK93817265", today());
    let f = &r.fields;

    assert_eq!(f.amount.unwrap().to_string(), "500");
    assert_eq!(f.transaction_id.as_deref(), Some("TK93817265"));
    assert_eq!(f.direction, Some(Direction::Expense));
    assert_eq!(f.category.as_deref(), Some("Transfer"));
    assert!(!r.insights.iter().any(|i| i == HIGH_VALUE));
}

#[test]
fn test_bengali_deposit_message() {
    let r = parse_local("আপনার অ্যাকাউন্টে ৫০০ টাকা জমা হয়েছে। তারিখ ০৩/০১/২০২৬", today());
    let f = &r.fields;
    assert_eq!(f.amount.unwrap().to_string(), "500");
    assert_eq!(f.direction, Some(Direction::Income));
    assert_eq!(f.category.as_deref(), Some("Deposit"));
    assert_eq!(f.date, NaiveDate::from_ymd_opt(2026, 1, 3));
    // amount + date + intent
    assert_eq!(r.confidence, 70);
    assert_eq!(r.insights, vec![POSITIVE_CASH_FLOW]);
}

#[test]
fn test_high_value_income() {
    let r = parse_local(
        "You have received Tk 12,000.00 from Acme Ltd. TrxID BHK7TQ2M1A at 01/02/2026",
        today(),
    );
    let f = &r.fields;
    assert_eq!(f.merchant.as_deref(), Some("Acme Ltd"));
    assert_eq!(r.confidence, 100);
    assert_eq!(r.insights, vec![HIGH_VALUE, POSITIVE_CASH_FLOW]);
}

#[test]
fn test_utility_bill_without_amount() {
    let r = parse_local("DESCO electricity bill payment due", today());
    assert_eq!(r.fields.category.as_deref(), Some("Utilities"));
    assert!(r.fields.amount.is_none());
    assert_eq!(r.insights, vec![RECURRING_BILL, MANUAL_AMOUNT]);
}

#[test]
fn test_confidence_bounds() {
    let parser = LocalParser::new(today());
    for text in [
        "",
        " ",
        "x",
        FOODPANDA,
        "৳৳৳ টাকা TrxID",
        "Tk 1 Tk 2 Tk 3 BDT 4 TrxID AAAAAAAA TxnID BBBBBBBB 01/01/2000 to to to from from",
    ] {
        let r = parser.parse(text);
        assert!(r.confidence <= 100, "{text:?} -> {}", r.confidence);
    }
    assert_eq!(parser.parse("").confidence, 0);
}

#[test]
fn test_each_pass_is_independent() {
    let parser = LocalParser::new(today());
    let first = parser.parse(FOODPANDA);
    let _ = parser.parse("nothing useful");
    let again = parser.parse(FOODPANDA);
    assert_eq!(first, again);
}
