//! 发货流程状态机
//!
//! ```text
//! Idle → Creating → GeneratingGuides → AwaitingChoice → Downloading(..) → Idle
//!   ↑__________________ Failed / Reset (任意状态) __________________________|
//! ```

use crate::error::FlowError;
use std::fmt;

/// PDF 下载方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfChoice {
    /// 单个面单
    Individual(i64),
    /// 全部面单合并
    Combined,
}

/// 流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Creating,
    GeneratingGuides,
    AwaitingChoice,
    Downloading(PdfChoice),
}

/// 流程事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    Submit,
    LabelsCreated,
    GuidesGenerated,
    ChoosePdf(PdfChoice),
    DownloadFinished,
    Failed,
    Reset,
}

impl FlowState {
    /// 是否有请求在进行中（此时不接受新的提交）
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            FlowState::Creating | FlowState::GeneratingGuides | FlowState::Downloading(_)
        )
    }

    /// 唯一的状态转换函数
    ///
    /// 单个 PDF 下载完成后回到 `AwaitingChoice`，操作员可以继续下载其他面单；
    /// 合并下载完成后流程结束。
    pub fn apply(self, event: FlowEvent) -> Result<FlowState, FlowError> {
        use FlowEvent as E;
        use FlowState as S;

        match (self, event) {
            (_, E::Reset) => Ok(S::Idle),
            (S::Idle, E::Submit) => Ok(S::Creating),
            (s, E::Submit) if s.is_processing() => Err(FlowError::Busy),
            (S::Creating, E::LabelsCreated) => Ok(S::GeneratingGuides),
            (S::GeneratingGuides, E::GuidesGenerated) => Ok(S::AwaitingChoice),
            (S::AwaitingChoice, E::ChoosePdf(choice)) => Ok(S::Downloading(choice)),
            (S::Downloading(PdfChoice::Individual(_)), E::DownloadFinished) => {
                Ok(S::AwaitingChoice)
            }
            (S::Downloading(PdfChoice::Combined), E::DownloadFinished) => Ok(S::Idle),
            (s, E::Failed) if s != S::Idle => Ok(S::Idle),
            (from, event) => Err(FlowError::InvalidTransition {
                from: from.to_string(),
                event: format!("{:?}", event),
            }),
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Idle => write!(f, "idle"),
            FlowState::Creating => write!(f, "creating"),
            FlowState::GeneratingGuides => write!(f, "generating-guides"),
            FlowState::AwaitingChoice => write!(f, "awaiting-pdf-choice"),
            FlowState::Downloading(PdfChoice::Individual(id)) => {
                write!(f, "downloading-individual({})", id)
            }
            FlowState::Downloading(PdfChoice::Combined) => write!(f, "downloading-combined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_combined() {
        let s = FlowState::Idle
            .apply(FlowEvent::Submit)
            .and_then(|s| s.apply(FlowEvent::LabelsCreated))
            .and_then(|s| s.apply(FlowEvent::GuidesGenerated))
            .and_then(|s| s.apply(FlowEvent::ChoosePdf(PdfChoice::Combined)))
            .unwrap();
        assert!(s.is_processing());
        assert_eq!(s.apply(FlowEvent::DownloadFinished), Ok(FlowState::Idle));
    }

    #[test]
    fn test_individual_download_returns_to_choice() {
        let s = FlowState::Downloading(PdfChoice::Individual(7));
        assert_eq!(s.apply(FlowEvent::DownloadFinished), Ok(FlowState::AwaitingChoice));
    }

    #[test]
    fn test_submit_while_processing_is_busy() {
        for s in [
            FlowState::Creating,
            FlowState::GeneratingGuides,
            FlowState::Downloading(PdfChoice::Combined),
        ] {
            assert_eq!(s.apply(FlowEvent::Submit), Err(FlowError::Busy));
        }
    }

    #[test]
    fn test_failure_returns_to_idle() {
        for s in [
            FlowState::Creating,
            FlowState::GeneratingGuides,
            FlowState::AwaitingChoice,
            FlowState::Downloading(PdfChoice::Individual(1)),
        ] {
            assert_eq!(s.apply(FlowEvent::Failed), Ok(FlowState::Idle));
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(matches!(
            FlowState::Idle.apply(FlowEvent::GuidesGenerated),
            Err(FlowError::InvalidTransition { .. })
        ));
        assert!(FlowState::Idle.apply(FlowEvent::Failed).is_err());
        assert!(FlowState::AwaitingChoice.apply(FlowEvent::Submit).is_err());
        assert!(FlowState::Creating
            .apply(FlowEvent::ChoosePdf(PdfChoice::Combined))
            .is_err());
    }

    #[test]
    fn test_reset_from_anywhere() {
        assert_eq!(
            FlowState::GeneratingGuides.apply(FlowEvent::Reset),
            Ok(FlowState::Idle)
        );
        assert_eq!(FlowState::Idle.apply(FlowEvent::Reset), Ok(FlowState::Idle));
    }
}
