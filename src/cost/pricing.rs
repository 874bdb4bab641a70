//! GCP price models for custom machine types and block storage.
//!
//! Rates are us-central1 list prices. Estimates are list-price
//! approximations of what a task cost, not billing data.

const SECONDS_PER_HOUR: f64 = 3600.0;
// GCP bills block storage per 730-hour month.
const SECONDS_PER_MONTH: f64 = 730.0 * SECONDS_PER_HOUR;

/// Standard persistent disk.
pub struct PersistentDisk;

impl PersistentDisk {
    const COST_PER_GB_MONTH: f64 = 0.04;

    pub fn estimate(size_gb: f64, runtime_seconds: f64) -> f64 {
        size_gb * Self::COST_PER_GB_MONTH * runtime_seconds / SECONDS_PER_MONTH
    }
}

/// Locally attached SSD scratch disk.
pub struct LocalSsd;

impl LocalSsd {
    const COST_PER_GB_MONTH: f64 = 0.08;

    pub fn estimate(size_gb: f64, runtime_seconds: f64) -> f64 {
        size_gb * Self::COST_PER_GB_MONTH * runtime_seconds / SECONDS_PER_MONTH
    }
}

/// Custom N1 machine type, the Lifesciences Pipelines API default.
pub struct CustomN1;

impl CustomN1 {
    const CPU_HOUR: f64 = 0.033174;
    const GB_HOUR: f64 = 0.004446;
    const PREEMPTIBLE_CPU_HOUR: f64 = 0.00698;
    const PREEMPTIBLE_GB_HOUR: f64 = 0.00094;

    pub fn estimate(cpus: u32, memory_gb: f64, runtime_seconds: f64, preemptible: bool) -> f64 {
        instance_cost(
            cpus,
            memory_gb,
            runtime_seconds,
            if preemptible {
                (Self::PREEMPTIBLE_CPU_HOUR, Self::PREEMPTIBLE_GB_HOUR)
            } else {
                (Self::CPU_HOUR, Self::GB_HOUR)
            },
        )
    }
}

/// Custom N2/N2D machine type, used when a newer cpu platform is requested.
pub struct CustomN2;

impl CustomN2 {
    const CPU_HOUR: f64 = 0.033598;
    const GB_HOUR: f64 = 0.004503;
    const PREEMPTIBLE_CPU_HOUR: f64 = 0.00813;
    const PREEMPTIBLE_GB_HOUR: f64 = 0.00109;

    pub fn estimate(cpus: u32, memory_gb: f64, runtime_seconds: f64, preemptible: bool) -> f64 {
        instance_cost(
            cpus,
            memory_gb,
            runtime_seconds,
            if preemptible {
                (Self::PREEMPTIBLE_CPU_HOUR, Self::PREEMPTIBLE_GB_HOUR)
            } else {
                (Self::CPU_HOUR, Self::GB_HOUR)
            },
        )
    }
}

fn instance_cost(
    cpus: u32,
    memory_gb: f64,
    runtime_seconds: f64,
    (cpu_rate, gb_rate): (f64, f64),
) -> f64 {
    let hours = runtime_seconds / SECONDS_PER_HOUR;
    f64::from(cpus) * cpu_rate * hours + memory_gb * gb_rate * hours
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_runtime_costs_nothing() {
        assert_eq!(PersistentDisk::estimate(500.0, 0.0), 0.0);
        assert_eq!(LocalSsd::estimate(375.0, 0.0), 0.0);
        assert_eq!(CustomN1::estimate(16, 64.0, 0.0, false), 0.0);
        assert_eq!(CustomN2::estimate(16, 64.0, 0.0, true), 0.0);
    }

    #[test]
    fn test_n1_hourly_rate() {
        let cost = CustomN1::estimate(4, 15.0, 3600.0, false);
        let expected = 4.0 * 0.033174 + 15.0 * 0.004446;
        assert!((cost - expected).abs() < 1e-9);
    }

    #[test]
    fn test_preemptible_discount() {
        let on_demand = CustomN1::estimate(8, 30.0, 7200.0, false);
        let preemptible = CustomN1::estimate(8, 30.0, 7200.0, true);
        assert!(preemptible < on_demand);

        let on_demand = CustomN2::estimate(8, 30.0, 7200.0, false);
        let preemptible = CustomN2::estimate(8, 30.0, 7200.0, true);
        assert!(preemptible < on_demand);
    }

    #[test]
    fn test_disk_cost_scales_linearly() {
        let base = PersistentDisk::estimate(50.0, 3600.0);
        assert!((PersistentDisk::estimate(100.0, 3600.0) - 2.0 * base).abs() < 1e-12);
        assert!((PersistentDisk::estimate(50.0, 7200.0) - 2.0 * base).abs() < 1e-12);
    }

    #[test]
    fn test_local_ssd_costs_more_than_persistent() {
        assert!(LocalSsd::estimate(50.0, 3600.0) > PersistentDisk::estimate(50.0, 3600.0));
    }

    #[test]
    fn test_month_of_persistent_disk_is_list_price() {
        let cost = PersistentDisk::estimate(1.0, SECONDS_PER_MONTH);
        assert!((cost - 0.04).abs() < 1e-12);
    }
}
