//! Dashboard aggregates over payout history.

use crate::domain::{Decimal, EventKind, HistoricalEvent};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Assumed billing period when projecting the next payment.
pub const PAYMENT_PERIOD_DAYS: i64 = 30;

const MEMBER_COLORS: [&str; 5] = ["#31D183", "#4F8DFD", "#FFC53D", "#00AEEF", "#8B5CF6"];

/// Donut shares: created and executed payouts against everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryShares {
    pub payouts: u32,
    pub other: u32,
}

pub fn category_shares(events: &[HistoricalEvent]) -> CategoryShares {
    let payouts = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Created | EventKind::Executed))
        .count();
    let other = events.len() - payouts;
    let total = Decimal::from(events.len().max(1) as u32);

    let share = |count: usize| {
        (Decimal::from(count as u32) / total * Decimal::hundred())
            .round_half_up(0)
            .to_u32()
            .unwrap_or(0)
    };

    CategoryShares {
        payouts: share(payouts),
        other: share(other),
    }
}

/// Amount of the newest executed payout, if it parses.
pub fn latest_executed_amount(events: &[HistoricalEvent]) -> Option<Decimal> {
    events
        .iter()
        .find(|e| e.kind == EventKind::Executed)
        .and_then(|e| e.amount.as_deref())
        .and_then(|a| Decimal::from_str_canonical(a).ok())
}

fn executed_amounts<'a>(
    events: &'a [HistoricalEvent],
) -> impl Iterator<Item = (&'a HistoricalEvent, Decimal)> + 'a {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Executed)
        .filter_map(|e| {
            let raw = e.amount.as_deref().unwrap_or("0");
            Decimal::from_str_canonical(raw).ok().map(|amount| (e, amount))
        })
}

/// Sum of every executed payout. Unparseable amounts, and any that would
/// overflow the running total, are left out.
pub fn total_distributed(events: &[HistoricalEvent]) -> Decimal {
    executed_amounts(events).fold(Decimal::zero(), |acc, (_, amount)| {
        acc.checked_add(amount).unwrap_or(acc)
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberShare {
    pub payee: String,
    pub amount: Decimal,
    /// Rounded percent of everything paid out to listed payees.
    pub share: u32,
    pub color: String,
}

/// Executed amounts grouped by payee, in first-seen order. Events without a
/// payee are not attributed to anyone.
pub fn member_shares(events: &[HistoricalEvent]) -> Vec<MemberShare> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for (event, amount) in executed_amounts(events) {
        let Some(payee) = event.payee.as_deref() else {
            continue;
        };
        match totals.iter_mut().find(|(p, _)| p == payee) {
            Some((_, sum)) => *sum = sum.checked_add(amount).unwrap_or(*sum),
            None => totals.push((payee.to_string(), amount)),
        }
    }

    let grand_total = totals
        .iter()
        .fold(Decimal::zero(), |acc, (_, v)| acc.checked_add(*v).unwrap_or(acc));
    let divisor = if grand_total.is_zero() {
        Decimal::from(1u32)
    } else {
        grand_total
    };

    totals
        .into_iter()
        .enumerate()
        .map(|(i, (payee, amount))| {
            let share = amount
                .checked_div(divisor)
                .map(|ratio| (ratio * Decimal::hundred()).round_half_up(0))
                .and_then(|pct| pct.to_u32())
                .unwrap_or(0);
            MemberShare {
                payee,
                amount,
                share,
                color: MEMBER_COLORS[i % MEMBER_COLORS.len()].to_string(),
            }
        })
        .collect()
}

/// Distinct payees across all events.
pub fn active_members(events: &[HistoricalEvent]) -> usize {
    events
        .iter()
        .filter_map(|e| e.payee.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

/// Newest executed payout, else newest creation, plus one billing period.
/// Expects `events` newest first.
pub fn next_payment(events: &[HistoricalEvent]) -> Option<DateTime<Utc>> {
    events
        .iter()
        .find(|e| e.kind == EventKind::Executed)
        .or_else(|| events.iter().find(|e| e.kind == EventKind::Created))
        .map(|e| e.timestamp + Duration::days(PAYMENT_PERIOD_DAYS))
}
