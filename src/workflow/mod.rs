use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::config::Config;
use crate::llm::invoker::InvocationMode;
use crate::pipeline::{
    PipelineBundle, PipelineInput, PipelineOrchestrator, RunState, Stage, StageObserver,
};
use crate::topology;

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: Vec<(String, Instant)>,
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: Vec::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .push((phase_name.to_string(), Instant::now()));
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let position = self
            .phase_start_times
            .iter()
            .position(|(name, _)| name == phase_name)?;
        let (name, start_time) = self.phase_start_times.remove(position);
        let duration = start_time.elapsed();
        self.phase_durations.push((name, duration));
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 按完成顺序获取各阶段的执行时间
    pub fn get_phase_durations(&self) -> &[(String, Duration)] {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 控制台观察者：打印阶段进度，增量模式下实时输出新增文本
pub struct ConsoleObserver {
    mode: InvocationMode,
    printed: Mutex<usize>,
    timing: Mutex<TimingScope>,
}

impl ConsoleObserver {
    pub fn new(mode: InvocationMode) -> Self {
        Self {
            mode,
            printed: Mutex::new(0),
            timing: Mutex::new(TimingScope::new()),
        }
    }

    pub fn timing_report(&self) -> String {
        match self.timing.lock() {
            Ok(timing) => timing.generate_timing_report(),
            Err(_) => String::new(),
        }
    }
}

impl StageObserver for ConsoleObserver {
    fn on_state_change(&self, state: RunState) {
        match state {
            RunState::Running(stage) => {
                if let Ok(mut printed) = self.printed.lock() {
                    *printed = 0;
                }
                if let Ok(mut timing) = self.timing.lock() {
                    timing.start_phase(stage.name());
                }
                println!("🤖 执行 {} 智能体...", stage);
            }
            RunState::Failed(stage) => {
                eprintln!("❌ {} 智能体执行失败", stage);
            }
            RunState::Done => println!("✓ 四个智能体全部执行完毕"),
            RunState::Idle => {}
        }
    }

    fn on_progress(&self, _stage: Stage, prefix: &str) {
        if self.mode != InvocationMode::Streaming {
            return;
        }
        let Ok(mut printed) = self.printed.lock() else {
            return;
        };
        if let Some(delta) = prefix.get(*printed..) {
            print!("{}", delta);
            if let Err(e) = std::io::stdout().flush() {
                debug!(error = %e, "failed to flush streaming output");
            }
        }
        *printed = prefix.len();
    }

    fn on_stage_completed(&self, stage: Stage, _text: &str) {
        if self.mode == InvocationMode::Streaming {
            println!();
        }
        if let Ok(mut timing) = self.timing.lock() {
            timing.end_phase(stage.name());
        }
        println!("✓ {} 完成", stage);
    }
}

/// 打印运行结果
pub fn print_bundle(bundle: &PipelineBundle) {
    if bundle.is_empty() {
        println!("⚠️ 问题描述为空，未运行任何智能体");
        return;
    }

    for (stage, icon) in Stage::ALL.iter().zip(["🧑‍💼", "🔎", "💻", "🧐"]) {
        println!("\n{} {}\n{}", icon, stage, bundle.text(*stage));
    }
    if let Some(label) = &bundle.session_label {
        println!("\n📜 Session ID: {}", label.display_tag());
    }
}

/// 运行结果与附带产物
#[derive(Debug)]
pub struct LaunchOutcome {
    pub bundle: PipelineBundle,
    pub topology_path: Option<PathBuf>,
}

/// 使用给定的编排器执行一次运行，并按配置输出拓扑图
pub async fn run_with(
    orchestrator: &PipelineOrchestrator,
    config: &Config,
    input: &PipelineInput,
) -> Result<LaunchOutcome> {
    let observer = ConsoleObserver::new(orchestrator.mode());

    println!(
        "🚀 开始执行多智能体流水线 (语言: {}, 温度: {:.1}, 模式: {})",
        input.language.native_name(),
        input.temperature,
        orchestrator.mode()
    );

    let bundle = orchestrator.run_observed(input, &observer).await?;
    print_bundle(&bundle);

    if config.verbose {
        println!("\n{}", observer.timing_report());
    }

    // 空运行不产出拓扑图
    let topology_path = if config.render_topology && !bundle.is_empty() {
        let path = match &config.topology_output {
            Some(path) => topology::render_to(path)?,
            None => topology::render()?,
        };
        println!("🗺️ 流水线拓扑图: {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(LaunchOutcome {
        bundle,
        topology_path,
    })
}

/// 启动多智能体流水线
///
/// 凭证缺失或配置非法时在任何模型调用之前失败。
pub async fn launch(config: &Config, input: &PipelineInput) -> Result<LaunchOutcome> {
    let orchestrator = PipelineOrchestrator::from_config(config)?;
    run_with(&orchestrator, config, input).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_scope_records_phases_in_order() {
        let mut timing = TimingScope::new();
        timing.start_phase("CEO");
        timing.start_phase("Researcher");
        assert!(timing.end_phase("CEO").is_some());
        assert!(timing.end_phase("Researcher").is_some());
        assert!(timing.end_phase("Coder").is_none());

        let names: Vec<&str> = timing
            .get_phase_durations()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["CEO", "Researcher"]);

        let report = timing.generate_timing_report();
        assert!(report.contains("总执行时间"));
        assert!(report.contains("- CEO:"));
    }

    #[test]
    fn test_console_observer_tracks_stage_timing() {
        let observer = ConsoleObserver::new(InvocationMode::Streaming);
        observer.on_state_change(RunState::Running(Stage::Ceo));
        observer.on_progress(Stage::Ceo, "Sm");
        observer.on_progress(Stage::Ceo, "Smart");
        observer.on_stage_completed(Stage::Ceo, "Smart");

        assert!(observer.timing_report().contains("- CEO:"));
    }
}
