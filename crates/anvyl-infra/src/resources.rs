//! Live CPU/memory/disk sampling for the local host
//! `GET /hosts/{id}/metrics`, reconciler step 4).

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResourceSample {
    pub cpu_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub disk_used_bytes: u64,
    pub disk_total_bytes: u64,
    pub load_avg_1m: f64,
}

pub fn sample_local() -> ResourceSample {
    let mut sys = System::new_all();
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let cpu_percent = if sys.cpus().is_empty() {
        0.0
    } else {
        sys.cpus().iter().map(|c| c.cpu_usage()).sum::<f32>() / sys.cpus().len() as f32
    };

    let disks = Disks::new_with_refreshed_list();
    let (disk_used, disk_total) = disks.iter().fold((0u64, 0u64), |(used, total), disk| {
        let disk_total = disk.total_space();
        let disk_free = disk.available_space();
        (used + disk_total.saturating_sub(disk_free), total + disk_total)
    });

    ResourceSample {
        cpu_percent,
        memory_used_bytes: sys.used_memory(),
        memory_total_bytes: sys.total_memory(),
        disk_used_bytes: disk_used,
        disk_total_bytes: disk_total,
        load_avg_1m: System::load_average().one,
    }
}
