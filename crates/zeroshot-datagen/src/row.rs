//! Whole rows: one value per column, then the rules that tie columns of the
//! same record together.
//!
//! An identity document's number and issuer follow its type, even when the
//! type column itself was not selected for the file. Some columns are
//! optional in real records and are left blank at a fixed rate.

use chrono::NaiveDateTime;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::values::{self, DOC_TYPES, Kind};

/// Share of rows in which a column is left blank.
const BLANK_RATES: &[(&str, f64)] = &[
    ("短信内容", 0.5),
    ("收藏列表", 0.7),
    ("住宿信息", 0.8),
    ("冷链温度监控(℃)", 0.8),
    ("订单交易", 0.5),
    ("会员消费记录", 0.5),
];

fn blank_rate(header: &str) -> f64 {
    BLANK_RATES
        .iter()
        .find(|(name, _)| *name == header)
        .map_or(0.0, |&(_, rate)| rate)
}

/// Positions of the identity document columns in a row.
#[derive(Debug, Clone, Copy)]
struct IdentityColumns {
    doc_type: Option<usize>,
    number: Option<usize>,
    issuer: Option<usize>,
}

impl IdentityColumns {
    fn find(headers: &[&str]) -> Option<Self> {
        let position = |name: &str| headers.iter().position(|h| *h == name);
        let columns = Self {
            doc_type: position("证件类型"),
            number: position("证件号码"),
            issuer: position("签发机关"),
        };
        (columns.number.is_some() || columns.issuer.is_some()).then_some(columns)
    }

    fn apply<R: Rng + ?Sized>(&self, record: &mut [String], rng: &mut R, now: NaiveDateTime) {
        let doc_type = match self.doc_type {
            Some(i) => record[i].clone(),
            None => DOC_TYPES.choose(rng).copied().unwrap_or("身份证").to_string(),
        };
        let (number, issuer) = values::identity_document(&doc_type, rng, now);
        if let Some(i) = self.number {
            record[i] = number;
        }
        if let Some(i) = self.issuer {
            record[i] = issuer;
        }
    }
}

/// Column layout of one file, resolved once and reused for every row.
#[derive(Debug, Clone)]
pub struct RowTemplate {
    headers: Vec<&'static str>,
    kinds: Vec<Kind>,
    blank_rates: Vec<f64>,
    identity: Option<IdentityColumns>,
}

impl RowTemplate {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            kinds: headers.iter().map(|h| values::kind_of(h)).collect(),
            blank_rates: headers.iter().map(|h| blank_rate(h)).collect(),
            identity: IdentityColumns::find(&headers),
            headers,
        }
    }

    pub fn headers(&self) -> &[&'static str] {
        &self.headers
    }

    /// One record, in header order.
    pub fn row<R: Rng + ?Sized>(&self, rng: &mut R, now: NaiveDateTime) -> Vec<String> {
        let mut record: Vec<String> = self
            .headers
            .iter()
            .zip(&self.kinds)
            .map(|(h, kind)| values::value(*kind, h, &mut *rng, now))
            .collect();
        if let Some(identity) = &self.identity {
            identity.apply(&mut record, rng, now);
        }
        for (cell, &rate) in record.iter_mut().zip(&self.blank_rates) {
            if rate > 0.0 && rng.random_bool(rate) {
                cell.clear();
            }
        }
        record
    }
}
