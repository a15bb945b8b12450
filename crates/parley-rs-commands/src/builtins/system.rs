//! Host resource reporting.

use crate::{Command, CommandArgs, CommandContext};
use async_trait::async_trait;
use chrono::Utc;
use parley_rs_protocol::CommandError;
use sysinfo::{Disks, System};

/// Snapshot of host resource usage.
#[derive(Debug, Clone, PartialEq)]
pub struct HostUsage {
    pub os: String,
    pub memory_percent: f64,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    /// Usage of the disk mounted at `/` (or the first disk found).
    pub disk_percent: f64,
    pub uptime_secs: u64,
}

impl HostUsage {
    /// Sample the host now.
    pub fn sample() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        let used = sys.used_memory();

        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .find(|disk| disk.mount_point() == std::path::Path::new("/"))
            .or_else(|| disks.list().first());
        let disk_percent = disk
            .map(|disk| {
                let total = disk.total_space();
                let used = total.saturating_sub(disk.available_space());
                percent(used, total)
            })
            .unwrap_or(0.0);

        let os = match (System::name(), System::os_version()) {
            (Some(name), Some(version)) => format!("{name} {version}"),
            (Some(name), None) => name,
            _ => "unknown".to_string(),
        };

        Self {
            os,
            memory_percent: percent(used, total),
            memory_used_mb: used / 1024 / 1024,
            memory_total_mb: total / 1024 / 1024,
            disk_percent,
            uptime_secs: System::uptime(),
        }
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 1000.0).round() / 10.0
}

/// `3d 4h 5m` style rendering of a duration in seconds.
pub(crate) fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Reports host memory, disk, uptime and the stored record count.
#[derive(Debug, Default)]
pub struct SystemInfoCommand;

#[async_trait]
impl Command for SystemInfoCommand {
    fn name(&self) -> &str {
        "system_info"
    }

    fn description(&self) -> &str {
        "Show host resource usage"
    }

    async fn call(&self, ctx: &CommandContext, _args: CommandArgs) -> Result<String, CommandError> {
        let usage = tokio::task::spawn_blocking(HostUsage::sample)
            .await
            .map_err(|err| CommandError::ExecutionFailed(format!("host sampling failed: {err}")))?;
        Ok(format!(
            "💻 **System information:**\n\n\
             **OS:** {}\n\
             **Memory:** {}% used ({}MB / {}MB)\n\
             **Disk:** {}% used\n\
             **Uptime:** {}\n\n\
             **Stored memories:** {}\n\
             **Time:** {}",
            usage.os,
            usage.memory_percent,
            usage.memory_used_mb,
            usage.memory_total_mb,
            usage.disk_percent,
            format_uptime(usage.uptime_secs),
            ctx.services.memory.count(),
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        ))
    }
}
