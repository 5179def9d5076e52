//! 订单选择状态

use crate::error::ValidationError;
use std::collections::BTreeSet;

/// 操作员当前选中的订单集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<i64>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换单个订单的选中状态
    pub fn toggle(&mut self, order_id: i64) {
        if !self.selected.remove(&order_id) {
            self.selected.insert(order_id);
        }
    }

    /// 切换"本页全选"
    ///
    /// 本页订单已全部选中时全部取消，否则补齐未选中的。空页不做任何事。
    pub fn toggle_all_on_page(&mut self, page_order_ids: &[i64]) {
        if page_order_ids.is_empty() {
            return;
        }
        if self.all_selected(page_order_ids) {
            for id in page_order_ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(page_order_ids.iter().copied());
        }
    }

    /// 本页是否已全部选中
    pub fn all_selected(&self, page_order_ids: &[i64]) -> bool {
        !page_order_ids.is_empty() && page_order_ids.iter().all(|id| self.selected.contains(id))
    }

    pub fn contains(&self, order_id: i64) -> bool {
        self.selected.contains(&order_id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// 选中的订单 ID
    pub fn order_ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    /// 至少选中一个订单
    pub fn ensure_not_empty(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Err(ValidationError::EmptySelection)
        } else {
            Ok(())
        }
    }
}
