use crate::runtime::RawStats;

/// CPU utilisation of a container across all of its logical CPUs, as an
/// integer percentage (so 4 saturated cores read 400).
///
/// Zero unless both the container and system counters advanced since the
/// previous sample. The fractional part is truncated.
pub fn cpu_percent(
    cpu_total: u64,
    precpu_total: u64,
    system_total: u64,
    presystem_total: u64,
    cpu_count: u32,
) -> u64 {
    let cpu_delta = cpu_total as f64 - precpu_total as f64;
    let system_delta = system_total as f64 - presystem_total as f64;

    if cpu_delta > 0.0 && system_delta > 0.0 {
        ((cpu_delta / system_delta) * cpu_count as f64 * 100.0) as u64
    } else {
        0
    }
}

/// Memory usage as an integer percentage of the limit. A zero limit reads 0.
pub fn memory_percent(usage: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    (usage as f64 / limit as f64 * 100.0) as u64
}

pub fn cpu_percent_of(stats: &RawStats) -> u64 {
    cpu_percent(
        stats.cpu_total_usage,
        stats.precpu_total_usage,
        stats.system_cpu_usage,
        stats.presystem_cpu_usage,
        stats.cpu_count,
    )
}

pub fn memory_percent_of(stats: &RawStats) -> u64 {
    memory_percent(stats.memory_usage, stats.memory_limit)
}
