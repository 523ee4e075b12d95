use crate::pipeline::stage::Stage;

/// 一次运行的状态
///
/// `Idle → Running(CEO) → … → Running(Critic) → Done`，任何运行中状态都可以转入 `Failed`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running(Stage),
    Done,
    Failed(Stage),
}

impl RunState {
    /// 当前阶段成功后的下一个状态，终态保持不变
    pub fn advance(self) -> RunState {
        match self {
            RunState::Idle => RunState::Running(Stage::Ceo),
            RunState::Running(stage) => match stage.next() {
                Some(next) => RunState::Running(next),
                None => RunState::Done,
            },
            terminal => terminal,
        }
    }

    /// 当前阶段失败后的状态
    pub fn fail(self) -> RunState {
        match self {
            RunState::Running(stage) => RunState::Failed(stage),
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed(_))
    }
}

/// 运行过程的观察者，用于渐进式展示
///
/// 观察者只能看到数据，不能影响下一阶段的输入。
pub trait StageObserver: Send + Sync {
    fn on_state_change(&self, _state: RunState) {}

    /// 增量模式下每产出一个前缀调用一次
    fn on_progress(&self, _stage: Stage, _prefix: &str) {}

    fn on_stage_completed(&self, _stage: Stage, _text: &str) {}
}

/// 什么也不做的观察者
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {}
