use parley_rs_commands::CommandServices;
use parley_rs_memory::MemoryStore;
use std::sync::Arc;
use tempfile::TempDir;

/// Command services rooted in a temporary directory. Keep the value alive
/// for the duration of the test; dropping it removes the directory.
pub struct TestServices {
    pub dir: TempDir,
    pub services: CommandServices,
}

/// Workspace under `<tmp>/workspace` and memory at `<tmp>/memory.json`
/// holding at most `capacity` records.
pub fn test_services(capacity: Option<usize>) -> TestServices {
    let dir = tempfile::tempdir().expect("tempdir");
    let workspace = dir.path().join("workspace");
    std::fs::create_dir_all(&workspace).expect("workspace dir");
    let memory = Arc::new(MemoryStore::open(dir.path().join("memory.json"), capacity));
    TestServices {
        services: CommandServices::new(workspace, memory),
        dir,
    }
}
