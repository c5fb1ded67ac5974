//! Persisted transaction shape and the record store seam

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::fields::{Direction, ParseResult};

/// Single assumed currency for every amount
pub const CURRENCY: &str = "BDT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("cannot record a transaction without an amount")]
    MissingAmount,
    #[error("cannot record a transaction without a direction")]
    MissingDirection,
    #[error("cannot record a transaction without a date")]
    MissingDate,
}

/// A reconciled parse reshaped for storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    /// Bank-issued transaction id, when the message carried one
    pub transaction_id: Option<String>,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    /// Positive = income, negative = expense
    pub amount: Decimal,
    pub currency: String,
    pub direction: Direction,
    pub category: String,
    pub confidence: u8,
    pub source: String,
}

impl TransactionRecord {
    /// Reshape a parse result. Amount, direction and date must all be present.
    pub fn from_result(result: &ParseResult) -> Result<Self, RecordError> {
        let f = &result.fields;
        let amount = f.amount.ok_or(RecordError::MissingAmount)?;
        let direction = f.direction.ok_or(RecordError::MissingDirection)?;
        let date = f.date.ok_or(RecordError::MissingDate)?;

        let signed = match direction {
            Direction::Expense => -amount.abs(),
            Direction::Income => amount.abs(),
        };

        Ok(Self {
            transaction_id: f.transaction_id.clone(),
            date,
            merchant: f.merchant.clone(),
            amount: signed,
            currency: CURRENCY.to_string(),
            direction,
            category: f
                .category
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_string()),
            confidence: result.confidence,
            source: result.source.clone().unwrap_or_else(|| "local".to_string()),
        })
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Returns true if this is income (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }
}

/// Where reconciled transactions end up. Storage schema is the store's business.
pub trait RecordStore {
    fn save(&mut self, record: &TransactionRecord) -> Result<()>;
}

/// Writes records as CSV rows (header on the first row) to any writer
pub struct CsvRecordStore<W: io::Write> {
    writer: csv::Writer<W>,
    written: usize,
}

impl<W: io::Write> CsvRecordStore<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flush csv records: {}", e.error()))
    }
}

impl<W: io::Write> RecordStore for CsvRecordStore<W> {
    fn save(&mut self, record: &TransactionRecord) -> Result<()> {
        self.writer
            .serialize(record)
            .with_context(|| format!("write record dated {}", record.date))?;
        self.writer.flush().context("flush csv writer")?;
        self.written += 1;
        Ok(())
    }
}
