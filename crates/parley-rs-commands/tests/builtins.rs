use async_trait::async_trait;
use parley_rs_commands::{
    BindingTable, CommandContext, CommandRegistry, CommandServices, WebProvider, WebSearchResult,
    builtin_command_registry, parse_invocation,
};
use parley_rs_memory::MemoryStore;
use parley_rs_protocol::CommandError;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct CannedWeb {
    results: Vec<WebSearchResult>,
}

#[async_trait]
impl WebProvider for CannedWeb {
    async fn search(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<WebSearchResult>, CommandError> {
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

struct Fixture {
    _temp: TempDir,
    root: std::path::PathBuf,
    memory: Arc<MemoryStore>,
    registry: CommandRegistry,
    ctx: CommandContext,
}

fn fixture(web: Option<Arc<dyn WebProvider>>) -> Fixture {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path().join("workspace");
    fs::create_dir_all(&root).expect("root");
    let memory = Arc::new(MemoryStore::open(
        temp.path().join("memory.json"),
        Some(100),
    ));
    let mut services = CommandServices::new(&root, memory.clone());
    services.web = web;
    Fixture {
        _temp: temp,
        root,
        memory,
        registry: builtin_command_registry(),
        ctx: CommandContext::for_user(Arc::new(services), "42"),
    }
}

/// Parse, bind and execute a command line the way the orchestrator does.
async fn run(fixture: &Fixture, line: &str) -> String {
    let invocation = parse_invocation(line).expect("invocation");
    let args = BindingTable::builtin()
        .bind(&invocation.name, &invocation.args)
        .expect("bind");
    fixture
        .registry
        .execute(&invocation.name, &fixture.ctx, args)
        .await
        .expect("known command")
}

#[tokio::test]
async fn registers_every_builtin() {
    let fixture = fixture(None);
    assert_eq!(
        fixture.registry.list(),
        vec![
            "challenge",
            "list_files",
            "search_memory",
            "system_info",
            "web_search",
            "write_file"
        ]
    );
}

#[tokio::test]
async fn search_memory_on_empty_store_reports_no_results() {
    let fixture = fixture(None);
    let mut args = BTreeMap::new();
    args.insert("query".to_string(), String::new());
    let reply = fixture
        .registry
        .execute("search_memory", &fixture.ctx, args)
        .await
        .expect("reply");
    assert!(reply.starts_with("❌ No results"), "{reply}");
}

#[tokio::test]
async fn search_memory_shows_top_three_summaries() {
    let fixture = fixture(None);
    for idx in 0..5 {
        fixture
            .memory
            .append(format!("user: coffee {idx}"), BTreeMap::new());
    }
    fixture.memory.append("user: tea", BTreeMap::new());

    let reply = run(&fixture, "search_memory Coffee").await;
    assert_eq!(
        reply,
        "🔍 **Memory results for 'Coffee':**\n\n1. user: coffee 4\n2. user: coffee 3\n3. user: coffee 2\n"
    );

    let recent = run(&fixture, "search_memory").await;
    assert!(recent.contains("1. user: tea"), "{recent}");
}

#[tokio::test]
async fn list_files_groups_directories_and_files() {
    let fixture = fixture(None);
    fs::create_dir_all(fixture.root.join("notes")).expect("dir");
    fs::create_dir_all(fixture.root.join("archive")).expect("dir");
    fs::write(fixture.root.join("b.txt"), "b").expect("file");
    fs::write(fixture.root.join("a.txt"), "a").expect("file");

    let reply = run(&fixture, "list_files").await;
    assert_eq!(
        reply,
        "📁 Contents of .:\n\n📂 Folders: archive, notes\n📄 Files: a.txt, b.txt"
    );

    let missing = run(&fixture, "list_files nowhere").await;
    assert_eq!(missing, "❌ Path not found: nowhere");
}

#[tokio::test]
async fn write_file_creates_parent_directories() {
    let fixture = fixture(None);
    let reply = run(&fixture, r#"write_file "deep/dir/test.txt" "Hello World""#).await;
    assert_eq!(reply, "✅ File written: deep/dir/test.txt");
    let written = fs::read_to_string(fixture.root.join("deep/dir/test.txt")).expect("read");
    assert_eq!(written, "Hello World");
}

#[tokio::test]
async fn write_file_outside_workspace_is_refused() {
    let fixture = fixture(None);
    let reply = run(&fixture, "write_file ../escape.txt nope").await;
    assert_eq!(reply, "❌ write_file: path escapes the workspace");
    assert!(!fixture.root.parent().expect("parent").join("escape.txt").exists());
}

#[tokio::test]
async fn web_search_lists_titles_and_urls() {
    let web = CannedWeb {
        results: vec![
            WebSearchResult {
                title: "Rust".to_string(),
                url: "https://www.rust-lang.org/".to_string(),
                snippet: "A language".to_string(),
            },
            WebSearchResult {
                title: "Tokio".to_string(),
                url: "https://tokio.rs/".to_string(),
                snippet: "Async runtime".to_string(),
            },
        ],
    };
    let fixture = fixture(Some(Arc::new(web)));
    let reply = run(&fixture, "web_search rust async").await;
    assert_eq!(
        reply,
        "🔍 **Web results for 'rust async':**\n\n• **Rust**\n  https://www.rust-lang.org/\n• **Tokio**\n  https://tokio.rs/\n"
    );
}

#[tokio::test]
async fn web_search_without_results_is_not_an_error() {
    let fixture = fixture(Some(Arc::new(CannedWeb { results: vec![] })));
    let reply = run(&fixture, "web_search obscure").await;
    assert_eq!(reply, "❌ No web results found for 'obscure'");
}

#[tokio::test]
async fn web_search_without_provider_is_unavailable() {
    let fixture = fixture(None);
    let reply = run(&fixture, "web_search anything").await;
    assert!(reply.contains("unavailable"), "{reply}");
}

#[tokio::test]
async fn system_info_reports_record_count() {
    let fixture = fixture(None);
    fixture.memory.append("one", BTreeMap::new());
    fixture.memory.append("two", BTreeMap::new());
    let reply = run(&fixture, "system_info").await;
    assert!(reply.contains("**Stored memories:** 2"), "{reply}");
    assert!(reply.contains("**Memory:**"));
    assert!(reply.contains("**Disk:**"));
}

#[tokio::test]
async fn challenge_levels() {
    let fixture = fixture(None);
    let default = run(&fixture, "challenge").await;
    assert!(default.contains("level 1"), "{default}");
    let unknown = run(&fixture, "challenge 7").await;
    assert!(unknown.contains("Unknown challenge"), "{unknown}");
}
