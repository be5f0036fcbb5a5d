//! Gap filling from grouped statistics
//!
//! Runs after loading, over whatever the table holds at that point. Each
//! pass reads all of its fill values with a single SELECT and then writes
//! them back by guid, so a value written by a pass never feeds the
//! statistics of that same pass. Later passes do see earlier writes.

use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use tiresearch_common::Result;
use tracing::{debug, info};

/// Fallback when no peer has a weight or tire diameter
pub const MEAN_FALLBACK: f64 = 25.0;
/// Fallback when no rim width mode exists even by section width
pub const WHEEL_WIDTH_FALLBACK: f64 = 6.0;

/// Column a pass fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputedField {
    Weight,
    TireDiameter,
    MinWheelWidth,
    MaxWheelWidth,
}

impl ImputedField {
    pub fn column(&self) -> &'static str {
        match self {
            ImputedField::Weight => "weight",
            ImputedField::TireDiameter => "tire_diameter",
            ImputedField::MinWheelWidth => "min_wheel_width",
            ImputedField::MaxWheelWidth => "max_wheel_width",
        }
    }
}

/// Peer rows a statistic is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// Same width, aspect ratio and wheel diameter
    SizeBucket,
    /// Same width only
    Width,
}

impl Grouping {
    fn predicate(&self) -> &'static str {
        match self {
            Grouping::SizeBucket => {
                "p.width = t.width AND p.aspect_ratio = t.aspect_ratio AND p.wheel_diameter = t.wheel_diameter"
            }
            Grouping::Width => "p.width = t.width",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statistic {
    Mean,
    Mode,
}

#[derive(Debug, Clone, Copy)]
struct Pass {
    field: ImputedField,
    statistic: Statistic,
    grouping: Grouping,
    /// Value for rows whose group yields nothing; `None` leaves them for a later pass
    fallback: Option<f64>,
}

const PASSES: [Pass; 6] = [
    Pass {
        field: ImputedField::Weight,
        statistic: Statistic::Mean,
        grouping: Grouping::SizeBucket,
        fallback: Some(MEAN_FALLBACK),
    },
    Pass {
        field: ImputedField::TireDiameter,
        statistic: Statistic::Mean,
        grouping: Grouping::SizeBucket,
        fallback: Some(MEAN_FALLBACK),
    },
    Pass {
        field: ImputedField::MinWheelWidth,
        statistic: Statistic::Mode,
        grouping: Grouping::SizeBucket,
        fallback: None,
    },
    Pass {
        field: ImputedField::MinWheelWidth,
        statistic: Statistic::Mode,
        grouping: Grouping::Width,
        fallback: Some(WHEEL_WIDTH_FALLBACK),
    },
    Pass {
        field: ImputedField::MaxWheelWidth,
        statistic: Statistic::Mode,
        grouping: Grouping::SizeBucket,
        fallback: None,
    },
    Pass {
        field: ImputedField::MaxWheelWidth,
        statistic: Statistic::Mode,
        grouping: Grouping::Width,
        fallback: Some(WHEEL_WIDTH_FALLBACK),
    },
];

impl Pass {
    /// Rows needing a value, each with its group statistic (NULL if none)
    fn select_sql(&self) -> String {
        let column = self.field.column();
        let gap = match self.statistic {
            Statistic::Mean => format!("t.{column} IS NULL"),
            Statistic::Mode => format!("(t.{column} IS NULL OR t.{column} = 0)"),
        };
        let stat = match self.statistic {
            Statistic::Mean => format!(
                "SELECT AVG(p.{column}) FROM tires p WHERE {} AND p.{column} IS NOT NULL",
                self.grouping.predicate()
            ),
            // Most frequent non-zero value, lowest value on a tie
            Statistic::Mode => format!(
                "SELECT p.{column} FROM tires p WHERE {} AND p.{column} IS NOT NULL AND p.{column} <> 0 \
                 GROUP BY p.{column} ORDER BY COUNT(*) DESC, p.{column} ASC LIMIT 1",
                self.grouping.predicate()
            ),
        };
        format!("SELECT t.guid, ({stat}) AS fill FROM tires t WHERE {gap}")
    }

    async fn run(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<PassReport> {
        let rows: Vec<(String, Option<f64>)> = sqlx::query_as(&self.select_sql())
            .fetch_all(&mut **tx)
            .await?;

        let update_sql = format!(
            "UPDATE tires SET {} = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
            self.field.column()
        );

        let mut report = PassReport {
            field: self.field,
            grouping: self.grouping,
            filled: 0,
            defaulted: 0,
            unresolved: 0,
        };

        for (guid, fill) in rows {
            let value = match (fill, self.fallback) {
                (Some(value), _) => {
                    report.filled += 1;
                    value
                }
                (None, Some(fallback)) => {
                    report.defaulted += 1;
                    fallback
                }
                (None, None) => {
                    report.unresolved += 1;
                    continue;
                }
            };
            sqlx::query(&update_sql)
                .bind(value)
                .bind(&guid)
                .execute(&mut **tx)
                .await?;
        }

        debug!(
            field = self.field.column(),
            grouping = ?self.grouping,
            filled = report.filled,
            defaulted = report.defaulted,
            unresolved = report.unresolved,
            "Imputation pass complete"
        );

        Ok(report)
    }
}

/// Counts for one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub field: ImputedField,
    pub grouping: Grouping,
    /// Filled from the group statistic
    pub filled: u64,
    /// Filled with the fallback constant
    pub defaulted: u64,
    /// Left for the next pass
    pub unresolved: u64,
}

/// Outcome of the imputation phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImputeReport {
    pub passes: Vec<PassReport>,
}

impl ImputeReport {
    /// Values written across all passes
    pub fn values_imputed(&self) -> u64 {
        self.passes.iter().map(|p| p.filled + p.defaulted).sum()
    }
}

/// Fill weight, tire diameter and rim width gaps inside `tx`
pub async fn impute(tx: &mut Transaction<'_, Sqlite>) -> Result<ImputeReport> {
    let mut report = ImputeReport::default();
    for pass in &PASSES {
        report.passes.push(pass.run(tx).await?);
    }

    info!(values_imputed = report.values_imputed(), "Imputation complete");
    Ok(report)
}
