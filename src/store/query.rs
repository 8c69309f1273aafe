// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt::Display;

use super::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Nature,
    Type,
    Class,
    Transaction,
    RecurringTransaction,
    Movie,
    InvestmentMovement,
    InvestmentType,
    Broker,
    ValueByNatureYearMonth,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Nature => "nature",
            Table::Type => "type",
            Table::Class => "class",
            Table::Transaction => "transaction",
            Table::RecurringTransaction => "recurring_transaction",
            Table::Movie => "movie",
            Table::InvestmentMovement => "investment_movement",
            Table::InvestmentType => "investment_type",
            Table::Broker => "broker",
            Table::ValueByNatureYearMonth => "vw_value_by_nature_year_month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// A select/update/delete target rendered as PostgREST query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: Table,
    select: String,
    filters: Vec<(String, String)>,
    order: Vec<(String, Order)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.to_string();
        self
    }

    fn filter(mut self, column: &str, op: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("{}.{}", op, value)));
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lte", value)
    }

    pub fn is(self, column: &str, value: bool) -> Self {
        self.filter(column, "is", value)
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order.push((column.to_string(), order));
        self
    }

    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn page(mut self, page: &Page) -> Self {
        self.limit = page.limit;
        if page.offset > 0 {
            self.offset = Some(page.offset);
        }
        self
    }

    /// Filters only, for PATCH and DELETE.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters.clone()
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut out = vec![("select".to_string(), self.select.clone())];
        out.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(col, o)| match o {
                    Order::Asc => format!("{}.asc", col),
                    Order::Desc => format!("{}.desc", col),
                })
                .collect::<Vec<_>>()
                .join(",");
            out.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            out.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            out.push(("offset".to_string(), offset.to_string()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn renders_filters_order_and_range() {
        let q = Query::from(Table::Transaction)
            .eq("class_id", 7)
            .gte("created_at", "2024-01-01T00:00:00Z")
            .order("created_at", Order::Desc)
            .order("id", Order::Desc)
            .range(50, 25);
        assert_eq!(
            q.params(),
            vec![
                pair("select", "*"),
                pair("class_id", "eq.7"),
                pair("created_at", "gte.2024-01-01T00:00:00Z"),
                pair("order", "created_at.desc,id.desc"),
                pair("limit", "25"),
                pair("offset", "50"),
            ]
        );
    }

    #[test]
    fn filter_params_drop_select_and_paging() {
        let q = Query::from(Table::RecurringTransaction)
            .select("id,paid_parcels")
            .eq("id", 3)
            .range(0, 1);
        assert_eq!(q.filter_params(), vec![pair("id", "eq.3")]);
        assert_eq!(q.table().as_str(), "recurring_transaction");
    }

    #[test]
    fn page_without_offset_only_limits() {
        let page = Page {
            limit: Some(10),
            offset: 0,
        };
        let q = Query::from(Table::Movie).is("archived", false).page(&page);
        assert_eq!(
            q.params(),
            vec![
                pair("select", "*"),
                pair("archived", "is.false"),
                pair("limit", "10"),
            ]
        );
    }
}
