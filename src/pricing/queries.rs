//! Database queries for rate plans and rate rules.

use chrono::NaiveDate;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::Result;

use super::models::{RatePlan, RateRule, RuleScope};

/// Get a rate plan by id
pub async fn find_rate_plan<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<Option<RatePlan>> {
    let plan = sqlx::query_as::<_, RatePlan>(
        r#"
        SELECT id, name, pricing_model, currency, is_active
        FROM pricing_rate_plan
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(plan)
}

/// Lock a rate plan row so rule writes for the plan serialize
pub async fn lock_rate_plan<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM pricing_rate_plan
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(id)
}

const RULE_COLUMNS: &str = r#"
    id, rate_plan_id, stay_type_id, room_type_id,
    start_date, end_date,
    base_price, price_per_adult, price_per_child, price_per_infant,
    price_per_extra_bed, single_use_supplement,
    included_occupancy, price_per_extra_person, created_at
"#;

/// Scope predicate for one tier, numbering its parameters from `first`.
///
/// A wildcard column is `IS NULL` and a scoped one an equality, so every
/// tier can use `pricing_rate_rule_lookup`.
fn scope_filter(scope: RuleScope, first: usize) -> (String, Vec<Uuid>) {
    let (stay_type_id, room_type_id) = scope.columns();
    let mut ids = Vec::with_capacity(2);
    let mut column = |name: &str, value: Option<Uuid>| match value {
        Some(id) => {
            ids.push(id);
            format!("{} = ${}", name, first + ids.len() - 1)
        }
        None => format!("{} IS NULL", name),
    };
    let stay = column("stay_type_id", stay_type_id);
    let room = column("room_type_id", room_type_id);
    (format!("{} AND {}", stay, room), ids)
}

/// Find the newest rule at exactly one specificity tier covering `date`.
pub async fn find_rule_at_scope<'e>(
    db: impl PgExecutor<'e>,
    rate_plan_id: Uuid,
    scope: RuleScope,
    date: NaiveDate,
) -> Result<Option<RateRule>> {
    let (filter, ids) = scope_filter(scope, 3);
    let sql = format!(
        r#"
        SELECT {}
        FROM pricing_rate_rule
        WHERE rate_plan_id = $1
          AND start_date <= $2
          AND end_date >= $2
          AND {}
        ORDER BY created_at DESC
        LIMIT 1
        "#,
        RULE_COLUMNS, filter
    );

    let mut query = sqlx::query_as::<_, RateRule>(&sql)
        .bind(rate_plan_id)
        .bind(date);
    for id in ids {
        query = query.bind(id);
    }
    let rule = query.fetch_optional(db).await?;

    Ok(rule)
}

/// All rules of a plan at one tier, for overlap checks
pub async fn rules_at_scope<'e>(
    db: impl PgExecutor<'e>,
    rate_plan_id: Uuid,
    scope: RuleScope,
) -> Result<Vec<RateRule>> {
    let (filter, ids) = scope_filter(scope, 2);
    let sql = format!(
        r#"
        SELECT {}
        FROM pricing_rate_rule
        WHERE rate_plan_id = $1
          AND {}
        ORDER BY start_date
        "#,
        RULE_COLUMNS, filter
    );

    let mut query = sqlx::query_as::<_, RateRule>(&sql).bind(rate_plan_id);
    for id in ids {
        query = query.bind(id);
    }
    let rules = query.fetch_all(db).await?;

    Ok(rules)
}

pub async fn insert_rule<'e>(db: impl PgExecutor<'e>, rule: &RateRule) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO pricing_rate_rule (
            id, rate_plan_id, stay_type_id, room_type_id,
            start_date, end_date,
            base_price, price_per_adult, price_per_child, price_per_infant,
            price_per_extra_bed, single_use_supplement,
            included_occupancy, price_per_extra_person, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(rule.id)
    .bind(rule.rate_plan_id)
    .bind(rule.stay_type_id)
    .bind(rule.room_type_id)
    .bind(rule.start_date)
    .bind(rule.end_date)
    .bind(rule.base_price)
    .bind(rule.price_per_adult)
    .bind(rule.price_per_child)
    .bind(rule.price_per_infant)
    .bind(rule.price_per_extra_bed)
    .bind(rule.single_use_supplement)
    .bind(rule.included_occupancy)
    .bind(rule.price_per_extra_person)
    .bind(rule.created_at)
    .execute(db)
    .await?;

    Ok(())
}
