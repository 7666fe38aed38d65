mod common;

use std::sync::Arc;

use cctv_dashboard::prompts::PromptSelector;
use cctv_dashboard::Error;
use serde_json::json;

use common::{prompt_url, prompts_url, FakeApi};

fn selector(api: &Arc<FakeApi>) -> PromptSelector {
    PromptSelector::new(api.clone(), prompts_url(), prompt_url())
}

#[tokio::test]
async fn list_is_served_from_cache() {
    let api = Arc::new(FakeApi::new());
    let prompts = selector(&api);

    let first = prompts.list().await.unwrap();
    let second = prompts.list().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.selected_id.as_deref(), Some("fire"));
    assert_eq!(first.prompts.len(), 2);
    assert_eq!(api.prompt_gets(), 1);
}

#[tokio::test]
async fn unknown_id_is_still_written_and_list_refetched() {
    let api = Arc::new(FakeApi::new());
    let prompts = selector(&api);
    prompts.list().await.unwrap();

    let config = prompts.select("ghost").await.unwrap();

    assert_eq!(api.put_bodies(), vec![json!({"selectedId": "ghost"})]);
    assert_eq!(api.puts.lock().unwrap()[0].0, prompt_url());
    assert_eq!(api.prompt_gets(), 2);
    assert_eq!(config.selected_id.as_deref(), Some("ghost"));
    assert_eq!(prompts.cached().await, Some(config));
}

#[tokio::test]
async fn reselecting_the_same_id_sends_again() {
    let api = Arc::new(FakeApi::new());
    let prompts = selector(&api);

    prompts.select("fire").await.unwrap();
    prompts.select("fire").await.unwrap();

    assert_eq!(api.put_bodies().len(), 2);
    assert_eq!(api.prompt_gets(), 2);
}

#[tokio::test]
async fn failed_write_leaves_cache_alone() {
    let api = Arc::new(FakeApi::new());
    let prompts = selector(&api);
    let before = prompts.list().await.unwrap();

    *api.fail_puts.lock().unwrap() = true;
    let err = prompts.select("safety").await.unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
    assert_eq!(prompts.cached().await, Some(before));
    assert_eq!(api.prompt_gets(), 1);
}

#[tokio::test]
async fn failed_refetch_after_write_leaves_no_stale_selection() {
    let api = Arc::new(FakeApi::new());
    let prompts = selector(&api);
    prompts.list().await.unwrap();

    *api.fail_prompt_gets.lock().unwrap() = true;
    let err = prompts.select("safety").await.unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert_eq!(api.put_bodies(), vec![json!({"selectedId": "safety"})]);
    assert_eq!(prompts.cached().await, None);
}
