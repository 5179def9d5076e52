//! 运单生成结果汇总

use crate::models::Guide;

/// 单个面单的最终记录
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub label_id: i64,
    pub guide: Option<Guide>,
    pub error: Option<String>,
}

impl LabelRecord {
    pub fn is_success(&self) -> bool {
        self.guide.is_some() && self.error.is_none()
    }
}

/// 一批面单的运单生成报告（按输入顺序，每个面单最多一条）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuideReport {
    records: Vec<LabelRecord>,
}

impl GuideReport {
    /// 记录一个面单的结果；重复的面单 ID 覆盖之前的结果
    pub fn record(&mut self, label_id: i64, result: Result<Guide, String>) {
        let record = match result {
            Ok(guide) => LabelRecord {
                label_id,
                guide: Some(guide),
                error: None,
            },
            Err(error) => LabelRecord {
                label_id,
                guide: None,
                error: Some(error),
            },
        };

        match self.records.iter_mut().find(|r| r.label_id == label_id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn records(&self) -> &[LabelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &LabelRecord> {
        self.records.iter().filter(|r| !r.is_success())
    }

    pub fn failed_label_ids(&self) -> Vec<i64> {
        self.failures().map(|r| r.label_id).collect()
    }
}
