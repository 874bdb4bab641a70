//! Machine-type descriptor parsing.

use crate::error::{Error, Result};

/// Parse a custom machine-type descriptor such as `custom-8-32768` or
/// `n2d-custom-8-32768` into a cpu count and memory size in GiB.
///
/// Only custom shapes are supported; memory in the descriptor is MiB.
pub fn parse_machine_type(machine_type: &str) -> Result<(u32, f64)> {
    let trimmed = machine_type.strip_prefix("n2d-").unwrap_or(machine_type);
    let parts: Vec<&str> = trimmed.splitn(3, '-').collect();
    if parts.len() != 3 || parts[0] != "custom" {
        return Err(Error::CostEstimation(format!(
            "Cannot estimate costs for machine type '{machine_type}'"
        )));
    }
    let parse_err =
        || Error::CostEstimation(format!("Cannot parse cpus and memory from '{machine_type}'"));
    let cpus: u32 = parts[1].parse().map_err(|_| parse_err())?;
    let memory_mib: f64 = parts[2].parse().map_err(|_| parse_err())?;
    Ok((cpus, memory_mib / 1024.0))
}
