//! Plain-text rendering of the dashboard panel.

use crate::poller::{PollState, Snapshot};
use crate::prompts::PromptConfig;

const HEADER: &str = "CCTV 안전 상황판";

pub fn render(snapshot: &Snapshot, prompts: Option<&PromptConfig>) -> String {
    let view = &snapshot.view;
    let mut lines = vec![
        format!("==================== {} ====================", HEADER),
        format!(
            "자동 업데이트: {} | 업데이트 주기 (초): {} | Prompt: {}",
            match snapshot.state {
                PollState::Active => "켜짐",
                PollState::Idle => "꺼짐",
            },
            snapshot.interval.as_secs_f64(),
            prompts
                .and_then(|config| config.selected_id.as_deref())
                .unwrap_or("-")
        ),
    ];
    if let Some(config) = prompts.filter(|config| !config.prompts.is_empty()) {
        let ids: Vec<String> = config
            .prompts
            .iter()
            .map(|prompt| {
                if config.selected_id.as_deref() == Some(prompt.id.as_str()) {
                    format!("*{}", prompt.id)
                } else {
                    prompt.id.clone()
                }
            })
            .collect();
        lines.push(format!("프롬프트 목록: {}", ids.join(", ")));
    }

    lines.push(format!("[{}] ({})", view.indicator_label, view.indicator_color));
    lines.push(format!("위험도: {}", view.risk_level));
    lines.push(format!("시각: {}", view.current_time_formatted));
    lines.push(format!("이미지: {}", view.image_url));
    lines.push("상황 설명:".to_string());
    lines.extend(view.caption.lines().map(|line| format!("  {}", line)));
    lines.push(format!("라벨: {}", view.labels.join(", ")));

    if snapshot.is_stale() {
        lines.push(format!(
            "(최근 {}회 업데이트 실패, 이전 데이터 표시 중: {})",
            snapshot.consecutive_failures,
            snapshot.last_error.as_deref().unwrap_or("unknown error")
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
