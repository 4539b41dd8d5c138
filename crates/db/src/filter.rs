//! Translation of validated list filters into `SeaORM` queries.

use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{Condition, EntityTrait, Order, QueryFilter, QueryOrder, Select, Value};
use tally_core::filter::{
    Comparator, FieldType, FilterCondition, FilterValue, SortOrder, ValidatedFilter,
};

/// An entity whose list endpoint accepts filter descriptors.
pub trait FilterableEntity: EntityTrait {
    /// Maps a filter field key to its column.
    fn filter_column(key: &str) -> Option<Self::Column>;

    /// Column matched by free-text search.
    fn search_column() -> Self::Column;

    /// Ordering used when the filter does not name a sort field.
    fn default_order() -> (Self::Column, Order);
}

/// Adds the filter's conditions, search and ordering to a select. Paging is left to the caller.
///
/// Field keys that do not map to a column are skipped; validation against the entity's field
/// table has already rejected unknown keys.
pub fn apply_filter<E: FilterableEntity>(select: Select<E>, filter: &ValidatedFilter) -> Select<E> {
    let mut condition = Condition::all();

    for role in &filter.conditions {
        if let Some(column) = E::filter_column(role.field) {
            condition = condition.add(condition_for::<E>(column, role));
        }
    }

    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col((E::default(), E::search_column())))).like(pattern),
        );
    }

    let (column, order) = filter
        .sort
        .and_then(|(key, direction)| E::filter_column(key).map(|c| (c, to_order(direction))))
        .unwrap_or_else(E::default_order);

    select.filter(condition).order_by(column, order)
}

fn to_order(direction: SortOrder) -> Order {
    match direction {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

/// Left-hand side of a comparison. Date fields compare on the calendar day.
fn lhs<E: FilterableEntity>(column: E::Column, field_type: FieldType) -> SimpleExpr {
    let col = Expr::col((E::default(), column));
    match field_type {
        FieldType::Date => col.cast_as(Alias::new("date")),
        _ => col.into(),
    }
}

fn condition_for<E: FilterableEntity>(column: E::Column, role: &FilterCondition) -> Condition {
    let left = || Expr::expr(lhs::<E>(column, role.field_type));
    let text = match &role.value {
        FilterValue::Text(text) => escape_like(text),
        _ => String::new(),
    };

    match role.comparator {
        Comparator::Equals => Condition::all().add(left().eq(to_value(&role.value))),
        Comparator::NotEquals => Condition::any()
            .add(left().ne(to_value(&role.value)))
            .add(left().is_null()),
        Comparator::Contains => Condition::all().add(left().like(format!("%{text}%"))),
        Comparator::NotContains => Condition::any()
            .add(left().not_like(format!("%{text}%")))
            .add(left().is_null()),
        Comparator::StartsWith => Condition::all().add(left().like(format!("{text}%"))),
        Comparator::Bigger => Condition::all().add(left().gt(to_value(&role.value))),
        Comparator::BiggerOrEqual => Condition::all().add(left().gte(to_value(&role.value))),
        Comparator::Smaller => Condition::all().add(left().lt(to_value(&role.value))),
        Comparator::SmallerOrEqual => Condition::all().add(left().lte(to_value(&role.value))),
        Comparator::Empty => {
            let condition = Condition::any().add(left().is_null());
            if role.field_type == FieldType::Text {
                condition.add(left().eq(""))
            } else {
                condition
            }
        }
        Comparator::NotEmpty => {
            let condition = Condition::all().add(left().is_not_null());
            if role.field_type == FieldType::Text {
                condition.add(left().ne(""))
            } else {
                condition
            }
        }
    }
}

fn to_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Text(text) => text.clone().into(),
        FilterValue::Number(number) => (*number).into(),
        FilterValue::Date(date) => (*date).into(),
        FilterValue::Boolean(flag) => (*flag).into(),
        FilterValue::None => Value::String(None),
    }
}

/// Escapes `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item_categories;
    use sea_orm::{DbBackend, QueryTrait};
    use tally_core::filter::{FilterDescriptor, FilterRole};
    use tally_core::item_category::ITEM_CATEGORY_FIELDS;

    fn sql(descriptor: &FilterDescriptor) -> String {
        let filter = descriptor.validate(ITEM_CATEGORY_FIELDS).unwrap();
        apply_filter(item_categories::Entity::find(), &filter)
            .build(DbBackend::Postgres)
            .to_string()
    }

    fn role(field: &str, comparator: Comparator, value: &str) -> FilterRole {
        FilterRole {
            field: field.to_string(),
            comparator,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_default_order() {
        let sql = sql(&FilterDescriptor::default());
        assert!(sql.ends_with(r#"ORDER BY "item_categories"."name" ASC"#), "{sql}");
    }

    #[test]
    fn test_sort_by_created_at_desc() {
        let sql = sql(&FilterDescriptor {
            sort_by: Some("created_at".to_string()),
            sort_order: SortOrder::Desc,
            ..FilterDescriptor::default()
        });
        assert!(sql.ends_with(r#"ORDER BY "item_categories"."created_at" DESC"#), "{sql}");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let sql = sql(&FilterDescriptor {
            search: Some("Hard Ware".to_string()),
            ..FilterDescriptor::default()
        });
        assert!(
            sql.contains(r#"LOWER("item_categories"."name") LIKE '%hard ware%'"#),
            "{sql}"
        );
    }

    #[test]
    fn test_text_comparators() {
        let sql = sql(&FilterDescriptor {
            roles: vec![
                role("name", Comparator::StartsWith, "Bo"),
                role("description", Comparator::Empty, ""),
            ],
            ..FilterDescriptor::default()
        });
        assert!(sql.contains(r#""item_categories"."name" LIKE 'Bo%'"#), "{sql}");
        assert!(sql.contains(r#""item_categories"."description" IS NULL"#), "{sql}");
        assert!(sql.contains(r#""item_categories"."description" = ''"#), "{sql}");
    }

    #[test]
    fn test_date_comparison_casts_to_date() {
        let sql = sql(&FilterDescriptor {
            roles: vec![role("created_at", Comparator::BiggerOrEqual, "2024-01-01")],
            ..FilterDescriptor::default()
        });
        assert!(
            sql.contains(r#"CAST("item_categories"."created_at" AS date) >= '2024-01-01'"#),
            "{sql}"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
