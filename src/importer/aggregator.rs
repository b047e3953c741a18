// ==========================================
// 人事取込バックエンド - 取込结果汇总
// ==========================================
// 职责: 累积 RowOutcome，结束时生成 ImportSummary
// 约束: 纯累积，无副作用；errors 按行号排序
// ==========================================

use crate::domain::import::{ImportSummary, RowErrorEntry, RowOutcome};

#[derive(Debug, Default)]
pub struct ResultAggregator {
    outcomes: Vec<RowOutcome>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        self.outcomes.push(outcome);
    }

    /// 已记录的行数
    pub fn recorded_rows(&self) -> usize {
        self.outcomes.len()
    }

    pub fn finish(mut self) -> ImportSummary {
        // 执行策略无关：按行号输出
        self.outcomes.sort_by_key(|o| o.row_index());

        let mut summary = ImportSummary::default();
        for outcome in self.outcomes {
            match outcome {
                RowOutcome::Accepted { was_update: true, .. } => summary.updated += 1,
                RowOutcome::Accepted { was_update: false, .. } => summary.created += 1,
                RowOutcome::Rejected { row_index, reason } => {
                    summary.rejected += 1;
                    summary.errors.push(RowErrorEntry {
                        row: row_index,
                        reason,
                    });
                }
            }
        }
        summary
    }
}
