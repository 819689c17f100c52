//! Report generation business logic.
//!
//! This module builds per-member summaries of a group: balances, the group
//! mirror, recent activity and what is still waiting for review. All functions
//! return structured data; the `format_*` helpers render it as plain text for
//! logs or any front end.

use crate::{
    entities::{
        CompletionStatus, TaskCompletion, Transaction, TransactionType, group, group_membership,
        task_completion, transaction, user,
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, prelude::*};

/// Number of recent transactions included when no limit is given.
pub const DEFAULT_RECENT_LIMIT: u64 = 10;

/// Everything worth showing about one member of one group.
#[derive(Debug, Clone)]
pub struct MemberReport {
    /// The group being reported on
    pub group: group::Model,
    /// The member's global account
    pub user: user::Model,
    /// The member's group-scoped mirror
    pub membership: group_membership::Model,
    /// Net points inside the group
    pub net_points: i64,
    /// Most recent transactions booked in this group for the member
    pub recent_transactions: Vec<transaction::Model>,
    /// Completions still waiting for an admin
    pub pending_completions: u64,
}

/// Generates a report for `user_id` in `group_id`.
///
/// # Arguments
/// * `db` - Database connection
/// * `group_id` - Group to report on
/// * `user_id` - Member to report on
/// * `transaction_limit` - Maximum number of recent transactions (default 10)
pub async fn generate_member_report(
    db: &DatabaseConnection,
    group_id: i64,
    user_id: &str,
    transaction_limit: Option<u64>,
) -> Result<MemberReport> {
    let group = crate::core::group::get_group_by_id(db, group_id)
        .await?
        .ok_or_else(|| Error::not_found("Group", group_id))?;
    let user = crate::core::user::require_user(db, user_id).await?;
    let membership = crate::core::group::get_membership(db, group_id, user_id)
        .await?
        .ok_or_else(|| Error::not_found("Group membership", format!("{group_id}/{user_id}")))?;

    let recent_transactions = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::GroupId.eq(group_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .limit(transaction_limit.unwrap_or(DEFAULT_RECENT_LIMIT))
        .all(db)
        .await?;

    let pending_completions = TaskCompletion::find()
        .filter(task_completion::Column::GroupId.eq(group_id))
        .filter(task_completion::Column::UserId.eq(user_id))
        .filter(task_completion::Column::Status.eq(CompletionStatus::Pending))
        .count(db)
        .await?;

    Ok(MemberReport {
        net_points: membership.net_points(),
        group,
        user,
        membership,
        recent_transactions,
        pending_completions,
    })
}

/// Formats a transaction amount with the sign of its direction.
///
/// Returns strings like "+20 pts" or "-5 pts".
#[must_use]
pub fn format_points(transaction_type: TransactionType, amount: i64) -> String {
    match transaction_type {
        TransactionType::Earn => format!("+{amount} pts"),
        TransactionType::Redeem | TransactionType::Penalty => format!("-{amount} pts"),
    }
}

/// Generates a summary line for a transaction.
#[must_use]
pub fn format_transaction_summary(transaction: &transaction::Model) -> String {
    let amount_str = format_points(transaction.transaction_type, transaction.amount);
    let desc = &transaction.description;
    let tx_type = transaction.transaction_type;

    format!("{amount_str} | {tx_type} | {desc}")
}

/// Renders a member report as multi-line plain text.
#[must_use]
pub fn format_member_report(report: &MemberReport) -> String {
    use std::fmt::Write;

    let mut out = format!(
        "{} in {} ({})\n",
        report.user.display_name, report.group.name, report.membership.role
    );

    // write! is infallible when writing to String
    let _ = writeln!(
        out,
        "  Balance: {} pts (earned {}, redeemed {}, penalized {})",
        report.user.current_points,
        report.user.total_earned,
        report.user.total_redeemed,
        report.user.total_penalized
    );
    let _ = writeln!(
        out,
        "  In this group: {} pts net | {} pending completion(s)",
        report.net_points, report.pending_completions
    );

    if report.recent_transactions.is_empty() {
        out.push_str("  No recent transactions\n");
    }
    for transaction in &report.recent_transactions {
        let _ = writeln!(out, "  {}", format_transaction_summary(transaction));
    }

    out
}
