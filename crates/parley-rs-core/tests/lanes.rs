use parley_rs_commands::CommandRegistry;
use parley_rs_core::{Orchestrator, PluginChain, UserLanes};
use parley_rs_protocol::InboundMessage;
use parley_rs_test_utils::{DummyCommand, PanickingPlugin, SlowCommand, TestServices, test_services};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn lanes_with(registry: CommandRegistry) -> (UserLanes, tempfile::TempDir) {
    let TestServices { dir, services } = test_services(None);
    let orchestrator = Orchestrator::new(Arc::new(services), registry);
    (UserLanes::new(Arc::new(orchestrator)), dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_users_messages_finish_in_arrival_order() {
    let registry = CommandRegistry::new();
    registry.register(Arc::new(SlowCommand::new("slow", Duration::from_millis(100))));
    registry.register(Arc::new(DummyCommand::new("fast").with_reply("fast")));
    let (lanes, _dir) = lanes_with(registry);

    let first = lanes.enqueue(InboundMessage::new("1", "Ada", "/cmd slow"));
    let second = lanes.enqueue(InboundMessage::new("1", "Ada", "/cmd fast"));

    let second = second.wait().await.expect("second reply");
    assert_eq!(second.text, "fast");
    // The slow command was queued first, so it is already recorded.
    let recorded: Vec<String> = lanes
        .orchestrator()
        .memory()
        .recent(10)
        .into_iter()
        .rev()
        .map(|record| record.content)
        .collect();
    assert_eq!(
        recorded,
        vec![
            "user: /cmd slow\nassistant: done".to_string(),
            "user: /cmd fast\nassistant: fast".to_string(),
        ]
    );
    assert_eq!(first.wait().await.expect("first reply").text, "done");
    assert_eq!(lanes.lane_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_users_do_not_wait_for_each_other() {
    let registry = CommandRegistry::new();
    registry.register(Arc::new(SlowCommand::new("slow", Duration::from_secs(5))));
    registry.register(Arc::new(DummyCommand::new("fast").with_reply("fast")));
    let (lanes, _dir) = lanes_with(registry);

    let _blocked = lanes.enqueue(InboundMessage::new("1", "Ada", "/cmd slow"));
    let other = tokio::time::timeout(
        Duration::from_secs(2),
        lanes.submit(InboundMessage::new("2", "Grace", "/cmd fast")),
    )
    .await
    .expect("user 2 is not blocked by user 1")
    .expect("reply");
    assert_eq!(other.text, "fast");
    assert_eq!(lanes.lane_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_plugin_leaves_the_lane_serving() {
    let TestServices { dir: _dir, services } = test_services(None);
    let plugins = PluginChain::new();
    plugins.register(Arc::new(PanickingPlugin::new("broken")));
    let orchestrator = Orchestrator::new(Arc::new(services), CommandRegistry::new())
        .with_plugins(plugins);
    let lanes = UserLanes::new(Arc::new(orchestrator));

    let help = lanes
        .submit(InboundMessage::new("1", "Ada", "/help"))
        .await
        .expect("help reply");
    assert!(!help.text.is_empty());
    let again = lanes
        .submit(InboundMessage::new("1", "Ada", "/help"))
        .await
        .expect("second reply");
    assert_eq!(again.text, help.text);
    assert_eq!(lanes.orchestrator().memory().count(), 2);
    assert_eq!(lanes.lane_count(), 1);
}
